pub mod status;
pub mod tokens;

use std::sync::Arc;

use anyhow::{Context, Result};
use scoutvision_auth::{
    AuthService, CacheBackendKind, MemoryRevocationCache, RevocationCache, TimedCache,
};

use crate::config::AppConfig;

/// Builds the revocation cache selected by `cache.backend`, bounded by
/// `cache.op_timeout_ms`.
///
/// A Redis backend that cannot be reached is an error, never a silent
/// fallback to the in-process cache.
pub async fn build_cache(config: &AppConfig) -> Result<Arc<dyn RevocationCache>> {
    let backend: Arc<dyn RevocationCache> = match config.cache.backend {
        CacheBackendKind::Memory => {
            tracing::warn!("using in-process revocation cache; state is not shared between instances");
            Arc::new(MemoryRevocationCache::new())
        }
        CacheBackendKind::Redis => {
            let cache = scoutvision_auth_redis::connect(&config.redis)
                .await
                .context("redis revocation cache unavailable")?;
            Arc::new(cache)
        }
    };

    Ok(Arc::new(TimedCache::new(backend, config.cache.op_timeout())))
}

/// Builds the token service for `config`.
pub async fn build_service(config: &AppConfig) -> Result<AuthService> {
    let cache = build_cache(config).await?;
    AuthService::new(config.auth.clone(), cache).context("invalid auth configuration")
}
