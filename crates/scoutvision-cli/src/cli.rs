use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scoutvision-auth")]
#[command(about = "ScoutVision token service: issue, validate, rotate and revoke tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file (defaults to ./scoutvision.toml if present)
    #[arg(short, long, global = true, env = "SCOUTVISION_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a token pair for an already authenticated subject
    Issue(IssueArgs),
    /// Check whether an access token is accepted
    Validate(ValidateArgs),
    /// Revoke an access token for the rest of its lifetime
    Revoke(RevokeArgs),
    /// Rotate a refresh token
    Refresh(RefreshArgs),
    /// Revoke an access token and drop its refresh token
    Logout(LogoutArgs),
    /// Probe the revocation cache
    Health,
    /// Inspect the effective configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct IssueArgs {
    /// Subject (user identifier)
    #[arg(short, long)]
    pub subject: String,
    /// Role to grant (repeatable; defaults to auth.default_roles)
    #[arg(short, long = "role")]
    pub roles: Vec<String>,
    /// Tenant (defaults to auth.default_tenant)
    #[arg(long)]
    pub tenant: Option<String>,
    /// Feature category (defaults to auth.default_category)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Access token
    pub token: String,
    /// Print the claims or the rejection reason
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::Args)]
pub struct RevokeArgs {
    /// Access token
    pub token: String,
}

#[derive(clap::Args)]
pub struct RefreshArgs {
    /// Refresh token to consume
    #[arg(long)]
    pub refresh_token: String,
    /// Owner of the refresh token
    #[arg(long, conflicts_with = "access_token", required_unless_present = "access_token")]
    pub subject: Option<String>,
    /// Previously issued access token (may be expired); its claims are kept
    #[arg(long)]
    pub access_token: Option<String>,
}

#[derive(clap::Args)]
pub struct LogoutArgs {
    /// Access token to revoke
    #[arg(long)]
    pub access_token: String,
    /// Owner of the session
    #[arg(long)]
    pub subject: String,
    /// Refresh token to drop
    #[arg(long)]
    pub refresh_token: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration with the secret masked
    Show,
}
