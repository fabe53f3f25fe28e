//! # scoutvision-auth-redis
//!
//! Redis implementation of the [`RevocationCache`] contract, shared by every
//! instance of the token service.
//!
//! ## Usage
//!
//! ```ignore
//! use scoutvision_auth_redis::{RedisConfig, connect};
//!
//! let cache = connect(&RedisConfig::default()).await?;
//! let service = AuthService::new(auth_config, Arc::new(cache))?;
//! ```
//!
//! Single-key atomicity comes from Redis itself: `SET NX` for the refresh
//! fence and `GETDEL` (Redis 6.2+) for atomic consumption.
//!
//! [`RevocationCache`]: scoutvision_auth::RevocationCache

mod cache;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use cache::RedisRevocationCache;

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379").
    pub url: String,

    /// Connection pool size.
    pub pool_size: usize,

    /// Pool wait/create/recycle timeout in milliseconds.
    pub timeout_ms: u64,

    /// Use `GETDEL` for refresh token consumption. Disable for servers older
    /// than 6.2, which then go through the `SET NX` fence.
    pub atomic_take: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            timeout_ms: 2000,
            atomic_take: true,
        }
    }
}

impl RedisConfig {
    /// Creates a configuration for `url` with default pool settings.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns the pool timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RedisCacheError::Config` for an empty URL or zero pool size.
    pub fn validate(&self) -> Result<(), RedisCacheError> {
        if self.url.trim().is_empty() {
            return Err(RedisCacheError::Config("redis.url cannot be empty".into()));
        }
        if self.pool_size == 0 {
            return Err(RedisCacheError::Config("redis.pool_size must be > 0".into()));
        }
        if self.timeout_ms == 0 {
            return Err(RedisCacheError::Config("redis.timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}

/// Errors raised while setting up the Redis backend.
#[derive(Debug, thiserror::Error)]
pub enum RedisCacheError {
    /// Invalid settings.
    #[error("Invalid Redis configuration: {0}")]
    Config(String),

    /// The pool could not be built.
    #[error("Failed to create Redis pool: {0}")]
    Pool(#[from] deadpool_redis::CreatePoolError),

    /// The initial connection or `PING` failed.
    #[error("Failed to connect to Redis at {url}: {message}")]
    Connect {
        /// Target URL.
        url: String,
        /// Underlying failure.
        message: String,
    },
}

/// Builds a pool for `config` and verifies the server answers `PING`.
///
/// Unlike a best-effort cache, the revocation ledger must not silently fall
/// back to process-local state, so any failure here is returned.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the pool cannot be
/// built, or the server does not respond.
pub async fn connect(config: &RedisConfig) -> Result<RedisRevocationCache, RedisCacheError> {
    config.validate()?;

    tracing::info!(url = %config.url, pool_size = config.pool_size, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(config.timeout());
    pool_config.timeouts.create = Some(config.timeout());
    pool_config.timeouts.recycle = Some(config.timeout());
    redis_config.pool = Some(pool_config);

    let pool = redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1))?;
    let cache = RedisRevocationCache::new(pool, config.atomic_take);

    cache
        .ping_server()
        .await
        .map_err(|e| RedisCacheError::Connect {
            url: config.url.clone(),
            message: e.to_string(),
        })?;

    tracing::info!(atomic_take = config.atomic_take, "Connected to Redis");
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RedisConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert!(config.atomic_take);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(RedisConfig::with_url("").validate().is_err());

        let mut config = RedisConfig::default();
        config.pool_size = 0;
        assert!(matches!(
            config.validate(),
            Err(RedisCacheError::Config(_))
        ));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: RedisConfig =
            serde_json::from_str(r#"{"url": "redis://cache:6380", "atomic_take": false}"#).unwrap();
        assert_eq!(config.url, "redis://cache:6380");
        assert_eq!(config.pool_size, 10);
        assert!(!config.atomic_take);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let mut config = RedisConfig::with_url("redis://127.0.0.1:1");
        config.timeout_ms = 200;
        let err = connect(&config).await.unwrap_err();
        assert!(matches!(err, RedisCacheError::Connect { .. }));
    }
}
