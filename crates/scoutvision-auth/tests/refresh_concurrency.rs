//! Concurrent refresh of a single token must produce exactly one winner,
//! both on backends with atomic take and on those relying on the fence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scoutvision_auth::{
    AuthConfig, AuthError, AuthService, CacheResult, MemoryRevocationCache, RevocationCache,
};

const SECRET: &str = "scoutvision-test-secret-0123456789abcdef";
const CONTENDERS: usize = 16;

/// Memory cache that hides its atomic take, forcing the fenced path.
struct FencedOnly(MemoryRevocationCache);

#[async_trait]
impl RevocationCache for FencedOnly {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        // Yield so contenders interleave between read and fence.
        tokio::task::yield_now().await;
        self.0.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.0.set(key, value, ttl).await
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        tokio::task::yield_now().await;
        self.0.set_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.0.delete(key).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.0.exists(key).await
    }

    async fn ping(&self) -> CacheResult<()> {
        self.0.ping().await
    }

    fn backend_name(&self) -> &'static str {
        "fenced"
    }
}

async fn race(cache: Arc<dyn RevocationCache>) {
    let service = Arc::new(AuthService::new(AuthConfig::with_secret(SECRET), cache).unwrap());
    let pair = service.authenticate_with_defaults("scout-42").await.unwrap();

    let mut handles = Vec::with_capacity(CONTENDERS);
    for _ in 0..CONTENDERS {
        let service = service.clone();
        let token = pair.refresh_token.clone();
        handles.push(tokio::spawn(async move {
            service.refresh(&token, "scout-42").await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(rotated) => {
                winners += 1;
                assert!(service.validate(&rotated.access_token).await);
            }
            Err(err) => assert!(matches!(err, AuthError::RefreshTokenInvalid), "{err}"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_with_atomic_take() {
    let cache = Arc::new(MemoryRevocationCache::new());
    assert!(cache.capabilities().atomic_take);
    race(cache).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_with_fence() {
    let cache = Arc::new(FencedOnly(MemoryRevocationCache::new()));
    assert!(!cache.capabilities().atomic_take);
    race(cache).await;
}

#[tokio::test]
async fn test_fenced_refresh_rotates_sequentially() {
    let cache = Arc::new(FencedOnly(MemoryRevocationCache::new()));
    let service = AuthService::new(AuthConfig::with_secret(SECRET), cache).unwrap();

    let mut pair = service.authenticate_with_defaults("scout-42").await.unwrap();
    for _ in 0..3 {
        let next = service.refresh(&pair.refresh_token, "scout-42").await.unwrap();
        assert!(matches!(
            service.refresh(&pair.refresh_token, "scout-42").await,
            Err(AuthError::RefreshTokenInvalid)
        ));
        pair = next;
    }
}
