//! # scoutvision-auth
//!
//! Access and refresh token management for the ScoutVision API.
//!
//! This crate provides:
//! - HS256 access token issuance and verification
//! - Single-use refresh token rotation
//! - Access token revocation backed by a shared cache
//! - A fail-closed validation path
//!
//! ## Overview
//!
//! Identity is established elsewhere. Once a subject and its claims are
//! known, [`AuthService::authenticate`] issues a token pair. The access token
//! is a self-contained signed JWT; the refresh token is an opaque random
//! value whose liveness is held only in the [`RevocationCache`]. Revocations
//! are recorded in the same cache for exactly as long as the revoked token
//! would otherwise remain valid.
//!
//! ## Modules
//!
//! - [`config`] - Token lifetimes, secret and cache settings
//! - [`token`] - Codec, issuer, validator and refresh coordinator
//! - [`storage`] - Revocation cache contract and in-process backends
//! - [`types`] - Wire types shared with callers
//! - [`service`] - The [`AuthService`] facade

pub mod clock;
pub mod config;
pub mod error;
pub mod service;
pub mod storage;
pub mod token;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, CacheBackendKind, CacheConfig, ConfigError};
pub use error::{AuthError, ErrorCategory};
pub use service::{AuthService, HealthState, HealthStatus};
pub use storage::{
    CacheCapabilities, CacheError, CacheResult, MemoryRevocationCache, RevocationCache, TimedCache,
};
pub use token::{
    AccessTokenClaims, CodecError, RefreshCoordinator, TokenCodec, TokenIssuer, TokenValidator,
};
pub use types::{AuthResponse, SubjectClaims, TokenPair};

/// Type alias for token operation results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use scoutvision_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, CacheConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::service::{AuthService, HealthStatus};
    pub use crate::storage::{CacheError, RevocationCache};
    pub use crate::types::{AuthResponse, SubjectClaims, TokenPair};
}
