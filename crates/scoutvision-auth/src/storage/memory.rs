//! In-process revocation cache backed by DashMap.
//!
//! Entries expire lazily: an expired entry is treated as absent on read and
//! removed when touched. Revocation keys are rarely read again after they
//! expire, so a long-lived process should run
//! [`MemoryRevocationCache::start_cleanup_task`] (or call
//! [`MemoryRevocationCache::purge_expired`] itself) to bound memory.
//!
//! This backend is only correct for a single process. Multiple instances
//! must share a Redis cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;

use super::{CacheCapabilities, CacheError, CacheResult, RevocationCache};
use crate::clock::{Clock, SystemClock};

/// A cached value with its absolute expiry.
#[derive(Clone, Debug)]
struct CachedEntry {
    value: String,
    expires_at: OffsetDateTime,
}

impl CachedEntry {
    fn new(value: &str, now: OffsetDateTime, ttl: Duration) -> CacheResult<Self> {
        let expires_at = time::Duration::try_from(ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| CacheError::invalid_ttl(ttl))?;
        Ok(Self {
            value: value.to_string(),
            expires_at,
        })
    }

    fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// DashMap-backed [`RevocationCache`].
///
/// Cloning shares the underlying map.
#[derive(Clone, Debug)]
pub struct MemoryRevocationCache {
    entries: Arc<DashMap<String, CachedEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryRevocationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRevocationCache {
    /// Creates an empty cache driven by the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Starts a background task calling [`purge_expired`](Self::purge_expired)
    /// every `every`. Abort the returned handle to stop it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_cleanup_task(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        let period = every.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                cache.purge_expired();
            }
        })
    }

    /// Remaining lifetime of `key`, if it is live.
    #[must_use]
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| Duration::try_from(entry.expires_at - now).ok())
    }
}

#[async_trait]
impl RevocationCache for MemoryRevocationCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired(now));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let entry = CachedEntry::new(value, self.clock.now(), ttl)?;
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let now = self.clock.now();
        let entry = CachedEntry::new(value, now, ttl)?;
        // The entry guard holds the shard lock, so check and insert are atomic.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(entry);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.clock.now();
        Ok(self
            .entries
            .remove(key)
            .map(|(_, entry)| entry)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value))
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    fn capabilities(&self) -> CacheCapabilities {
        CacheCapabilities { atomic_take: true }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
