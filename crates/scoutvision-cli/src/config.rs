use serde::{Deserialize, Serialize};

use scoutvision_auth::{AuthConfig, CacheBackendKind, CacheConfig};
use scoutvision_auth_redis::RedisConfig;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "scoutvision.toml";

/// Environment variable prefix, e.g. `SCOUTVISION__AUTH__JWT_SECRET`.
pub const ENV_PREFIX: &str = "SCOUTVISION";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.auth.validate().map_err(|e| e.to_string())?;
        self.cache.validate().map_err(|e| e.to_string())?;
        if self.cache.backend == CacheBackendKind::Redis {
            self.redis.validate().map_err(|e| e.to_string())?;
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    /// Copy safe to print: the signing secret is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.auth.jwt_secret.is_some() {
            cfg.auth.jwt_secret = Some("<redacted>".to_string());
        }
        cfg
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{AppConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads `path` (or `scoutvision.toml` if present) overlaid with
    /// `SCOUTVISION__*` environment variables, then validates the result.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., SCOUTVISION__AUTH__ACCESS_TOKEN_TTL_SECS=600
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("auth.default_roles"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
