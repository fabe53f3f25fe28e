//! Token service configuration.
//!
//! Lifetimes are expressed in whole seconds so they can be set directly from
//! environment variables.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! jwt_secret = "change-me-to-at-least-32-bytes-of-entropy"
//! access_token_ttl_secs = 3600
//! refresh_token_ttl_secs = 604800
//!
//! [cache]
//! backend = "redis"
//! op_timeout_ms = 2000
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::SubjectClaims;

/// Shortest signing secret accepted for HS256.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted refresh token lifetime (one year).
pub const MAX_REFRESH_TOKEN_TTL_SECS: u64 = 365 * 24 * 3600;

/// Token issuance and validation settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric HMAC-SHA-256 signing secret. Required.
    pub jwt_secret: Option<String>,

    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: u64,

    /// Tolerated clock skew when checking access token expiry.
    pub clock_skew_secs: u64,

    /// Roles granted when the identity source supplies none.
    pub default_roles: Vec<String>,

    /// Tenant assigned when the identity source supplies none.
    pub default_tenant: String,

    /// Feature category assigned when the identity source supplies none.
    pub default_category: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 7 * 24 * 3600,
            clock_skew_secs: 0,
            default_roles: vec!["User".to_string()],
            default_tenant: "default".to_string(),
            default_category: "Scouting".to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .field("default_roles", &self.default_roles)
            .field("default_tenant", &self.default_tenant)
            .field("default_category", &self.default_category)
            .finish()
    }
}

impl AuthConfig {
    /// Creates a configuration with the given secret and default lifetimes.
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Returns the access token lifetime.
    #[must_use]
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    /// Returns the refresh token lifetime.
    #[must_use]
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }

    /// Returns the tolerated clock skew.
    #[must_use]
    pub fn clock_skew(&self) -> Duration {
        Duration::from_secs(self.clock_skew_secs)
    }

    /// Returns the claims used when the identity source supplies none.
    #[must_use]
    pub fn default_claims(&self) -> SubjectClaims {
        SubjectClaims {
            roles: self.default_roles.clone(),
            tenant_id: self.default_tenant.clone(),
            category: self.default_category.clone(),
        }
    }

    /// Returns the signing secret, or an error if it is unset or too short.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no secret is configured and
    /// `ConfigError::InvalidValue` if it is shorter than [`MIN_SECRET_LEN`].
    pub fn secret(&self) -> Result<&str, ConfigError> {
        let secret = self
            .jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("auth.jwt_secret".to_string()))?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        Ok(secret)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is missing or short, if a lifetime is
    /// zero, if the refresh lifetime exceeds [`MAX_REFRESH_TOKEN_TTL_SECS`],
    /// if the access lifetime exceeds the refresh lifetime, or if the clock
    /// skew exceeds the access lifetime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.secret()?;

        if self.access_token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "auth.access_token_ttl_secs must be > 0".to_string(),
            ));
        }

        if self.refresh_token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "auth.refresh_token_ttl_secs must be > 0".to_string(),
            ));
        }

        if self.refresh_token_ttl_secs > MAX_REFRESH_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "auth.refresh_token_ttl_secs must be <= {MAX_REFRESH_TOKEN_TTL_SECS}"
            )));
        }

        if self.access_token_ttl_secs > self.refresh_token_ttl_secs {
            return Err(ConfigError::InvalidValue(
                "auth.access_token_ttl_secs must be <= auth.refresh_token_ttl_secs".to_string(),
            ));
        }

        if self.clock_skew_secs > self.access_token_ttl_secs {
            return Err(ConfigError::InvalidValue(
                "auth.clock_skew_secs must be <= auth.access_token_ttl_secs".to_string(),
            ));
        }

        if self.default_tenant.is_empty() {
            return Err(ConfigError::InvalidValue(
                "auth.default_tenant cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Which revocation cache backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// In-process cache. Only correct for a single instance.
    #[default]
    Memory,
    /// Shared Redis cache.
    Redis,
}

/// Revocation cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend selection.
    pub backend: CacheBackendKind,

    /// Upper bound for every cache operation, in milliseconds.
    pub op_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            op_timeout_ms: 2000,
        }
    }
}

impl CacheConfig {
    /// Returns the per-operation timeout.
    #[must_use]
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.op_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "cache.op_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl(), Duration::from_secs(3600));
        assert_eq!(config.refresh_token_ttl(), Duration::from_secs(604_800));
        assert_eq!(config.clock_skew(), Duration::ZERO);
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));

        let blank = AuthConfig::with_secret("   ");
        assert!(matches!(blank.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_short_secret_fails_validation() {
        let err = AuthConfig::with_secret("short").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_zero_ttl_fails_validation() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.access_token_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AuthConfig::with_secret(SECRET);
        config.refresh_token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_refresh_ttl_fails_validation() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.refresh_token_ttl_secs = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(msg)) if msg.contains("refresh_token_ttl_secs")
        ));

        config.refresh_token_ttl_secs = MAX_REFRESH_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_access_ttl_longer_than_refresh_fails_validation() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.access_token_ttl_secs = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(msg)) if msg.contains("access_token_ttl_secs")
        ));

        config.access_token_ttl_secs = config.refresh_token_ttl_secs;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_huge_clock_skew_fails_validation() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.clock_skew_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config() {
        assert!(AuthConfig::with_secret(SECRET).validate().is_ok());
    }

    #[test]
    fn test_default_claims() {
        let claims = AuthConfig::default().default_claims();
        assert_eq!(claims.roles, vec!["User".to_string()]);
        assert_eq!(claims.tenant_id, "default");
        assert_eq!(claims.category, "Scouting");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", AuthConfig::with_secret(SECRET));
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackendKind::Memory);
        assert_eq!(config.op_timeout(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cache_backend_kind_serde() {
        let kind: CacheBackendKind = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(kind, CacheBackendKind::Redis);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Missing("auth.jwt_secret".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required configuration: auth.jwt_secret"
        );
    }
}
