//! Token pair issuance.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AuthError;
use crate::storage::RevocationCache;
use crate::storage::keys::refresh_token_key;
use crate::token::codec::TokenCodec;
use crate::types::refresh_token::generate_refresh_token;
use crate::types::{SubjectClaims, TokenPair};

/// Mints access/refresh pairs and registers the refresh half in the cache.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    cache: Arc<dyn RevocationCache>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("cache", &self.cache.backend_name())
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer.
    #[must_use]
    pub fn new(
        codec: TokenCodec,
        cache: Arc<dyn RevocationCache>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            cache,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Lifetime of issued refresh tokens.
    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issues a new pair for `subject`.
    ///
    /// The refresh token is stored under `refresh_token:<subject>:<token>`
    /// with the subject as value and a TTL of the refresh lifetime.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidInput` if `subject` is empty or whitespace
    /// - `AuthError::CacheUnavailable` if the refresh token cannot be stored
    pub async fn issue_pair(
        &self,
        subject: &str,
        claims: &SubjectClaims,
    ) -> Result<TokenPair, AuthError> {
        if subject.trim().is_empty() {
            return Err(AuthError::invalid_input("subject must not be empty"));
        }

        let (access_token, access_claims) = self.codec.issue(subject, claims, self.access_ttl)?;
        let refresh_token = generate_refresh_token();

        self.cache
            .set(
                &refresh_token_key(subject, &refresh_token),
                subject,
                self.refresh_ttl,
            )
            .await
            .map_err(|e| {
                tracing::warn!(subject, error = %e, "failed to store refresh token");
                AuthError::from(e)
            })?;

        tracing::debug!(
            subject,
            tenant_id = %claims.tenant_id,
            expires_at = access_claims.exp,
            "issued token pair"
        );

        Ok(TokenPair::bearer(
            access_token,
            refresh_token,
            access_claims.expires_at(),
        ))
    }
}
