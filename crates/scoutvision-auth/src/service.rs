//! Token service facade.
//!
//! [`AuthService`] wires the codec, issuer, validator and refresh
//! coordinator around one shared revocation cache and exposes the public
//! operations. It is cheap to clone and safe to share across tasks.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::storage::RevocationCache;
use crate::storage::keys::refresh_token_key;
use crate::token::{AccessTokenClaims, RefreshCoordinator, TokenCodec, TokenIssuer, TokenValidator};
use crate::types::{SubjectClaims, TokenPair};

/// Outcome of a cache health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// The cache answered.
    Healthy,
    /// The cache could not be reached. Validation is rejecting tokens.
    Degraded,
}

/// Health report for the token service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Overall state.
    pub status: HealthState,
    /// Cache backend name.
    pub backend: String,
    /// Time taken by the probe.
    pub response_time_ms: u64,
    /// When the probe ran.
    #[serde(with = "time::serde::rfc3339")]
    pub checked_at: OffsetDateTime,
    /// Failure description when degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    /// Returns `true` if the cache answered.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

/// Issues, validates, rotates and revokes tokens.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    codec: TokenCodec,
    issuer: TokenIssuer,
    validator: TokenValidator,
    refresh: RefreshCoordinator,
    cache: Arc<dyn RevocationCache>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .field("cache", &self.cache.backend_name())
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a service using the wall clock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the configuration is invalid,
    /// most notably when the signing secret is missing or too short.
    pub fn new(config: AuthConfig, cache: Arc<dyn RevocationCache>) -> AuthResult<Self> {
        Self::with_clock(config, cache, Arc::new(SystemClock))
    }

    /// Creates a service driven by `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_clock(
        config: AuthConfig,
        cache: Arc<dyn RevocationCache>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        config.validate()?;

        let codec = TokenCodec::new(config.secret()?, clock)?;
        let issuer = TokenIssuer::new(
            codec.clone(),
            cache.clone(),
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        );
        let validator = TokenValidator::new(codec.clone(), cache.clone(), config.clock_skew());
        let refresh = RefreshCoordinator::new(issuer.clone(), codec.clone(), cache.clone());

        tracing::info!(
            backend = cache.backend_name(),
            atomic_take = cache.capabilities().atomic_take,
            access_ttl_secs = config.access_token_ttl_secs,
            refresh_ttl_secs = config.refresh_token_ttl_secs,
            "token service initialized"
        );

        Ok(Self {
            config,
            codec,
            issuer,
            validator,
            refresh,
            cache,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Name of the cache backend in use.
    #[must_use]
    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Issues a pair for a subject already authenticated by the identity
    /// source.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty subject, `CacheUnavailable` if the refresh
    /// token cannot be stored.
    pub async fn authenticate(
        &self,
        subject: &str,
        claims: &SubjectClaims,
    ) -> AuthResult<TokenPair> {
        self.issuer.issue_pair(subject, claims).await
    }

    /// Issues a pair carrying the configured default claims.
    ///
    /// # Errors
    ///
    /// Same as [`authenticate`](Self::authenticate).
    pub async fn authenticate_with_defaults(&self, subject: &str) -> AuthResult<TokenPair> {
        self.authenticate(subject, &self.config.default_claims())
            .await
    }

    /// Rotates `refresh_token` owned by `subject`. The new access token
    /// carries the configured default claims.
    ///
    /// # Errors
    ///
    /// `RefreshTokenInvalid` if the token is unknown, used, expired or owned
    /// by someone else; `CacheUnavailable` on backend failure.
    pub async fn refresh(&self, refresh_token: &str, subject: &str) -> AuthResult<TokenPair> {
        self.refresh
            .refresh(refresh_token, subject, &self.config.default_claims())
            .await
    }

    /// Rotates `refresh_token`, taking subject and claims from a previously
    /// issued (possibly expired) access token.
    ///
    /// # Errors
    ///
    /// `InvalidSignature`/`Malformed` if the access token does not verify,
    /// otherwise as [`refresh`](Self::refresh).
    pub async fn refresh_with_access_token(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> AuthResult<TokenPair> {
        self.refresh
            .refresh_with_access_token(access_token, refresh_token)
            .await
    }

    /// Returns `true` only for a well-formed, correctly signed, unexpired and
    /// unrevoked access token. Fails closed.
    pub async fn validate(&self, access_token: &str) -> bool {
        self.validator.is_valid(access_token).await
    }

    /// Validates and returns claims, or the precise rejection reason.
    ///
    /// # Errors
    ///
    /// See [`TokenValidator::check`].
    pub async fn check(&self, access_token: &str) -> AuthResult<AccessTokenClaims> {
        self.validator.check(access_token).await
    }

    /// Revokes an access token for the rest of its lifetime.
    ///
    /// # Errors
    ///
    /// `CacheUnavailable` if the revocation cannot be recorded.
    pub async fn revoke(&self, access_token: &str) -> AuthResult<()> {
        self.validator.revoke(access_token).await
    }

    /// Ends a session: revokes the access token and drops the refresh token.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty subject, `CacheUnavailable` on backend
    /// failure.
    pub async fn logout(
        &self,
        access_token: &str,
        subject: &str,
        refresh_token: &str,
    ) -> AuthResult<()> {
        if subject.trim().is_empty() {
            return Err(AuthError::invalid_input("subject must not be empty"));
        }

        self.validator.revoke(access_token).await?;
        if !refresh_token.is_empty() {
            self.cache
                .delete(&refresh_token_key(subject, refresh_token))
                .await?;
        }

        tracing::info!(subject, "session logged out");
        Ok(())
    }

    /// Probes the cache. Never fails; an unreachable cache is reported as
    /// degraded.
    pub async fn health(&self) -> HealthStatus {
        let started = Instant::now();
        let result = self.cache.ping().await;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (status, error) = match result {
            Ok(()) => (HealthState::Healthy, None),
            Err(err) => {
                tracing::warn!(
                    backend = self.cache.backend_name(),
                    error = %err,
                    "revocation cache health check failed"
                );
                (HealthState::Degraded, Some(err.to_string()))
            }
        };

        HealthStatus {
            status,
            backend: self.cache.backend_name().to_string(),
            response_time_ms,
            checked_at: self.codec.now(),
            error,
        }
    }

    /// Reads the claims of a correctly signed token regardless of expiry.
    ///
    /// Does not consult the revocation ledger.
    ///
    /// # Errors
    ///
    /// `InvalidSignature` or `Malformed` if the token does not verify.
    pub fn subject_from_expired_token(&self, access_token: &str) -> AuthResult<AccessTokenClaims> {
        Ok(self.codec.decode(access_token)?)
    }
}
