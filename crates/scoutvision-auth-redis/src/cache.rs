//! Redis-backed revocation cache.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use scoutvision_auth::storage::{CacheCapabilities, CacheError, CacheResult, RevocationCache};

/// [`RevocationCache`] over a deadpool Redis pool.
///
/// TTLs are sent in milliseconds (`PX`) and rounded up to at least 1 ms,
/// since Redis rejects a zero expiry.
#[derive(Clone)]
pub struct RedisRevocationCache {
    pool: Pool,
    atomic_take: bool,
}

impl std::fmt::Debug for RedisRevocationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRevocationCache")
            .field("pool_size", &self.pool.status().max_size)
            .field("atomic_take", &self.atomic_take)
            .finish()
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn command_error(operation: &'static str, err: redis::RedisError) -> CacheError {
    tracing::warn!(operation, error = %err, "Redis command failed");
    CacheError::unavailable(format!("{operation}: {err}"))
}

impl RedisRevocationCache {
    /// Wraps an existing pool. `atomic_take` selects `GETDEL` consumption.
    #[must_use]
    pub fn new(pool: Pool, atomic_take: bool) -> Self {
        Self { pool, atomic_take }
    }

    async fn conn(&self) -> CacheResult<Connection> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to get Redis connection");
            CacheError::unavailable(e.to_string())
        })
    }

    pub(crate) async fn ping_server(&self) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("PING", e))?;
        Ok(())
    }
}

#[async_trait]
impl RevocationCache for RedisRevocationCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("GET", e))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("SET", e))?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        // SET NX replies OK when written and nil when the key exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("SET NX", e))?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("DEL", e))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let count: i64 = redis::cmd("EXISTS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("EXISTS", e))?;
        Ok(count > 0)
    }

    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        if !self.atomic_take {
            return Err(CacheError::unsupported("take"));
        }
        let mut conn = self.conn().await?;
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("GETDEL", e))?;
        Ok(value)
    }

    async fn ping(&self) -> CacheResult<()> {
        self.ping_server().await
    }

    fn capabilities(&self) -> CacheCapabilities {
        CacheCapabilities {
            atomic_take: self.atomic_take,
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
