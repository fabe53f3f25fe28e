//! Single-use refresh token rotation.
//!
//! A refresh token is live while `refresh_token:<subject>:<token>` exists in
//! the cache. Rotating it consumes that entry and issues a fresh pair; the
//! entry is gone afterwards, so a replay finds nothing. Expiry is handled by
//! the cache TTL alone.
//!
//! Consumption must be atomic across instances sharing the cache:
//!
//! - backends advertising `atomic_take` (Redis `GETDEL`, the in-memory cache)
//!   remove and return the entry in one step
//! - other backends go through a fence: read the entry, then claim
//!   `consumed:<token>` with `set_if_absent`, then delete the entry. Only the
//!   caller that wins the fence proceeds

use std::sync::Arc;

use crate::error::AuthError;
use crate::storage::RevocationCache;
use crate::storage::keys::{consumed_marker_key, refresh_token_key};
use crate::token::codec::TokenCodec;
use crate::token::issuer::TokenIssuer;
use crate::types::{SubjectClaims, TokenPair};

/// Rotates refresh tokens.
#[derive(Clone)]
pub struct RefreshCoordinator {
    issuer: TokenIssuer,
    codec: TokenCodec,
    cache: Arc<dyn RevocationCache>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("cache", &self.cache.backend_name())
            .field("atomic_take", &self.cache.capabilities().atomic_take)
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Creates a coordinator issuing rotated pairs through `issuer`.
    #[must_use]
    pub fn new(issuer: TokenIssuer, codec: TokenCodec, cache: Arc<dyn RevocationCache>) -> Self {
        Self {
            issuer,
            codec,
            cache,
        }
    }

    /// Consumes `refresh_token` for `subject` and issues a new pair with
    /// `claims`.
    ///
    /// # Errors
    ///
    /// - `AuthError::RefreshTokenInvalid` if the token is unknown, expired,
    ///   already used, or owned by another subject
    /// - `AuthError::InvalidInput` if either argument is empty
    /// - `AuthError::CacheUnavailable` on backend failure
    pub async fn refresh(
        &self,
        refresh_token: &str,
        subject: &str,
        claims: &SubjectClaims,
    ) -> Result<TokenPair, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::invalid_input("refresh token must not be empty"));
        }
        if subject.trim().is_empty() {
            return Err(AuthError::invalid_input("subject must not be empty"));
        }

        self.consume(refresh_token, subject).await?;
        tracing::debug!(subject, "refresh token consumed");

        self.issuer.issue_pair(subject, claims).await
    }

    /// Rotates using the subject and claims of a previously issued access
    /// token.
    ///
    /// The access token's signature is verified but its expiry is ignored,
    /// so a client can present the token that just expired together with
    /// its refresh token.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidSignature` or `AuthError::Malformed` if the access
    ///   token does not verify
    /// - everything [`refresh`](Self::refresh) returns
    pub async fn refresh_with_access_token(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokenPair, AuthError> {
        let previous = self.codec.decode(access_token)?;
        self.refresh(refresh_token, &previous.sub, &previous.subject_claims())
            .await
    }

    /// Removes the live entry for `refresh_token`, succeeding for at most one
    /// caller.
    async fn consume(&self, refresh_token: &str, subject: &str) -> Result<(), AuthError> {
        let key = refresh_token_key(subject, refresh_token);

        let owner = if self.cache.capabilities().atomic_take {
            self.cache.take(&key).await?
        } else {
            self.consume_fenced(&key, refresh_token, subject).await?
        };

        match owner {
            Some(owner) if owner == subject => Ok(()),
            Some(_) => {
                tracing::warn!(subject, "refresh token owner mismatch");
                Err(AuthError::RefreshTokenInvalid)
            }
            None => {
                tracing::debug!(subject, "refresh token not live");
                Err(AuthError::RefreshTokenInvalid)
            }
        }
    }

    async fn consume_fenced(
        &self,
        key: &str,
        refresh_token: &str,
        subject: &str,
    ) -> Result<Option<String>, AuthError> {
        let Some(owner) = self.cache.get(key).await? else {
            return Ok(None);
        };

        let won = self
            .cache
            .set_if_absent(
                &consumed_marker_key(refresh_token),
                subject,
                self.issuer.refresh_ttl(),
            )
            .await?;
        if !won {
            tracing::debug!(subject, "lost refresh fence to a concurrent request");
            return Ok(None);
        }

        self.cache.delete(key).await?;
        Ok(Some(owner))
    }
}
