use anyhow::Result;
use clap::Parser;

use scoutvision_cli::cli::{Cli, Commands, ConfigCommands};
use scoutvision_cli::commands::{self, status, tokens};
use scoutvision_cli::config::{AppConfig, loader::load_config};
use scoutvision_cli::observability::{apply_logging_level, init_tracing_with_level};
use scoutvision_cli::output::print_error;

/// Exit code for configuration errors.
const EXIT_CONFIG: i32 = 2;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing_with_level("warn");

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("configuration error: {e}"));
            std::process::exit(EXIT_CONFIG);
        }
    };
    apply_logging_level(&config.logging.level);

    if let Err(e) = run(cli, config).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    if let Commands::Config(args) = &cli.command {
        return match args.command {
            ConfigCommands::Show => status::show_config(&config),
        };
    }

    let service = commands::build_service(&config).await?;

    match &cli.command {
        Commands::Issue(args) => tokens::issue(&service, args).await?,
        Commands::Validate(args) => tokens::validate(&service, args).await?,
        Commands::Revoke(args) => tokens::revoke(&service, &args.token).await?,
        Commands::Refresh(args) => tokens::refresh(&service, args).await?,
        Commands::Logout(args) => tokens::logout(&service, args).await?,
        Commands::Health => status::health(&service).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}
