//! Revocation cache contract and its in-process implementations.
//!
//! The cache is the only shared mutable state in the token service. It holds
//! two kinds of entries:
//!
//! - `revoked_token:<accessToken>` - access tokens that must be rejected
//!   until they would have expired anyway
//! - `refresh_token:<subject>:<refreshToken>` - refresh tokens that are still
//!   good for exactly one rotation
//!
//! Every operation is atomic for a single key. No multi-key transactions are
//! used or assumed.
//!
//! # Implementations
//!
//! - [`MemoryRevocationCache`] - DashMap-backed, for tests and single-instance
//!   deployments
//! - [`TimedCache`] - decorator that bounds each call with a timeout
//! - `scoutvision-auth-redis` - shared Redis backend

pub mod keys;
pub mod memory;
pub mod timed;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryRevocationCache;
pub use timed::TimedCache;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by a revocation cache backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached or returned an error.
    #[error("cache backend unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The operation did not complete within the configured bound.
    #[error("cache operation '{operation}' timed out after {after:?}")]
    Timeout {
        /// Name of the operation.
        operation: &'static str,
        /// The bound that elapsed.
        after: Duration,
    },

    /// The TTL cannot be represented by the backend.
    #[error("cache TTL {ttl:?} is out of range")]
    InvalidTtl {
        /// The rejected TTL.
        ttl: Duration,
    },

    /// The backend does not implement this operation.
    #[error("cache operation '{operation}' is not supported by this backend")]
    Unsupported {
        /// Name of the operation.
        operation: &'static str,
    },
}

impl CacheError {
    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    /// Creates a new `InvalidTtl` error.
    #[must_use]
    pub fn invalid_ttl(ttl: Duration) -> Self {
        Self::InvalidTtl { ttl }
    }

    /// Creates a new `Unsupported` error.
    #[must_use]
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }
}

/// Optional primitives a backend offers beyond the required set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheCapabilities {
    /// The backend implements [`RevocationCache::take`] as a single atomic
    /// get-and-delete.
    pub atomic_take: bool,
}

/// Key/value store with per-key TTL used as the token ledger.
///
/// # Atomicity
///
/// Each method must be atomic with respect to its key. In particular
/// [`set_if_absent`](Self::set_if_absent) must never report success to two
/// concurrent callers for the same key, and [`take`](Self::take) (when
/// advertised) must hand a value to at most one caller.
///
/// # Errors
///
/// Backend failures are reported as [`CacheError`]; callers decide whether to
/// fail closed (revocation checks) or open (health pings).
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// Returns the value stored under `key`, if any and not expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` for `ttl`, overwriting unconditionally.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Stores `value` under `key` for `ttl` only if no live entry exists.
    ///
    /// Returns `true` if this call created the entry.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Returns `true` if a live entry exists under `key`.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Atomically removes `key` and returns the value it held.
    ///
    /// Only meaningful when [`capabilities`](Self::capabilities) reports
    /// `atomic_take`; the default implementation refuses.
    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        let _ = key;
        Err(CacheError::unsupported("take"))
    }

    /// Checks that the backend is reachable.
    async fn ping(&self) -> CacheResult<()>;

    /// Reports the optional primitives this backend supports.
    fn capabilities(&self) -> CacheCapabilities {
        CacheCapabilities::default()
    }

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
