use anyhow::{Result, bail};
use colored::Colorize;
use scoutvision_auth::{AuthService, HealthState};

use crate::config::AppConfig;

pub async fn health(service: &AuthService) -> Result<()> {
    let health = service.health().await;

    let status = match health.status {
        HealthState::Healthy => "healthy".green(),
        HealthState::Degraded => "degraded".red(),
    };
    println!("{}: {}", "Status".cyan(), status);
    println!("{}: {}", "Backend".cyan(), health.backend);
    println!("{}: {} ms", "Response time".cyan(), health.response_time_ms);
    if let Some(error) = &health.error {
        println!("{}: {}", "Error".cyan(), error);
    }

    if !health.is_healthy() {
        bail!("revocation cache is unavailable; token validation is failing closed");
    }
    Ok(())
}

pub fn show_config(config: &AppConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}
