//! Timeout decorator for revocation caches.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{CacheCapabilities, CacheError, CacheResult, RevocationCache};

/// Wraps a cache so that no single operation can stall a request.
///
/// An elapsed bound is reported as [`CacheError::Timeout`], which the token
/// components treat like any other backend failure.
#[derive(Clone)]
pub struct TimedCache {
    inner: Arc<dyn RevocationCache>,
    timeout: Duration,
}

impl TimedCache {
    /// Wraps `inner`, bounding every call by `timeout`.
    #[must_use]
    pub fn new(inner: Arc<dyn RevocationCache>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The configured bound.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = CacheResult<T>> + Send,
    ) -> CacheResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    backend = self.inner.backend_name(),
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "cache operation timed out"
                );
                Err(CacheError::timeout(operation, self.timeout))
            }
        }
    }
}

impl std::fmt::Debug for TimedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedCache")
            .field("backend", &self.inner.backend_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl RevocationCache for TimedCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.bounded("get", self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.bounded("set", self.inner.set(key, value, ttl)).await
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        self.bounded("set_if_absent", self.inner.set_if_absent(key, value, ttl))
            .await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.bounded("delete", self.inner.delete(key)).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.bounded("exists", self.inner.exists(key)).await
    }

    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        self.bounded("take", self.inner.take(key)).await
    }

    async fn ping(&self) -> CacheResult<()> {
        self.bounded("ping", self.inner.ping()).await
    }

    fn capabilities(&self) -> CacheCapabilities {
        self.inner.capabilities()
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
