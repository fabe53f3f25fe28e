//! Access token validation and revocation.
//!
//! Validation runs the cheap, local checks first (structure, signature,
//! expiry) and only consults the revocation ledger for tokens that pass
//! them. Any failure to reach the ledger rejects the token.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AuthError;
use crate::storage::RevocationCache;
use crate::storage::keys::revoked_token_key;
use crate::token::claims::{AccessTokenClaims, remaining_until};
use crate::token::codec::TokenCodec;

/// Value stored under a revocation key. Only presence matters.
const REVOKED_MARKER: &str = "true";

/// Checks access tokens against the codec and the revocation ledger.
#[derive(Clone)]
pub struct TokenValidator {
    codec: TokenCodec,
    cache: Arc<dyn RevocationCache>,
    leeway: Duration,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("cache", &self.cache.backend_name())
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    /// Creates a validator tolerating `leeway` of clock skew on expiry.
    #[must_use]
    pub fn new(codec: TokenCodec, cache: Arc<dyn RevocationCache>, leeway: Duration) -> Self {
        Self {
            codec,
            cache,
            leeway,
        }
    }

    /// Returns `true` only for a well-formed, correctly signed, unexpired and
    /// unrevoked token.
    ///
    /// Never errors. A cache outage yields `false`.
    pub async fn is_valid(&self, access_token: &str) -> bool {
        match self.check(access_token).await {
            Ok(_) => true,
            Err(err @ AuthError::CacheUnavailable { .. }) => {
                tracing::warn!(error = %err, "rejecting token: revocation ledger unavailable");
                false
            }
            Err(err) => {
                tracing::debug!(reason = %err.category(), error = %err, "token rejected");
                false
            }
        }
    }

    /// Validates `access_token` and returns its claims.
    ///
    /// The returned error names the precise reason. It is meant for logs;
    /// callers facing clients should use [`AuthError::public_code`].
    ///
    /// # Errors
    ///
    /// - `Malformed`, `InvalidSignature` or `Expired` from the local checks,
    ///   in which case the cache is never consulted
    /// - `TokenRevoked` if a revocation entry exists
    /// - `CacheUnavailable` if the ledger cannot be read
    pub async fn check(&self, access_token: &str) -> Result<AccessTokenClaims, AuthError> {
        let claims = self.codec.decode_unexpired(access_token, self.leeway)?;

        if self.cache.exists(&revoked_token_key(access_token)).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Records `access_token` as revoked for the rest of its lifetime.
    ///
    /// Tokens that are malformed, forged, or already expired need no ledger
    /// entry; they are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CacheUnavailable` if the revocation cannot be
    /// recorded.
    pub async fn revoke(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = match self.codec.decode(access_token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring revocation of undecodable token");
                return Ok(());
            }
        };

        let remaining = self.revocation_ttl(&claims);
        if remaining.is_zero() {
            tracing::debug!(subject = %claims.sub, "token already expired, nothing to revoke");
            return Ok(());
        }

        self.cache
            .set(&revoked_token_key(access_token), REVOKED_MARKER, remaining)
            .await
            .map_err(|e| {
                tracing::warn!(subject = %claims.sub, error = %e, "failed to record revocation");
                AuthError::from(e)
            })?;

        tracing::info!(
            subject = %claims.sub,
            ttl_secs = remaining.as_secs(),
            "access token revoked"
        );
        Ok(())
    }

    /// How long a revocation entry must live: until the token would stop
    /// being accepted anyway, clock-skew tolerance included. Never longer.
    fn revocation_ttl(&self, claims: &AccessTokenClaims) -> Duration {
        let leeway = i64::try_from(self.leeway.as_secs()).unwrap_or(i64::MAX);
        remaining_until(claims.exp.saturating_add(leeway), self.codec.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryRevocationCache;
    use crate::types::SubjectClaims;
    use time::macros::datetime;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    struct Fixture {
        validator: TokenValidator,
        codec: TokenCodec,
        cache: Arc<MemoryRevocationCache>,
        clock: Arc<ManualClock>,
    }

    fn fixture(leeway: Duration) -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = Arc::new(MemoryRevocationCache::with_clock(clock.clone()));
        let codec = TokenCodec::new(SECRET, clock.clone()).unwrap();
        Fixture {
            validator: TokenValidator::new(codec.clone(), cache.clone(), leeway),
            codec,
            cache,
            clock,
        }
    }

    fn mint(codec: &TokenCodec, ttl_secs: u64) -> String {
        let claims = SubjectClaims::new(["User"], "default", "Scouting");
        codec
            .issue("scout-42", &claims, Duration::from_secs(ttl_secs))
            .unwrap()
            .0
    }

    #[tokio::test]
    async fn test_valid_token() {
        let f = fixture(Duration::ZERO);
        let token = mint(&f.codec, 3600);
        assert!(f.validator.is_valid(&token).await);
        assert_eq!(f.validator.check(&token).await.unwrap().sub, "scout-42");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let f = fixture(Duration::ZERO);
        let token = mint(&f.codec, 3600);

        f.clock.advance(Duration::from_secs(3601));
        assert!(!f.validator.is_valid(&token).await);
        assert!(matches!(
            f.validator.check(&token).await,
            Err(AuthError::Expired)
        ));
    }

    #[tokio::test]
    async fn test_leeway_extends_acceptance() {
        let f = fixture(Duration::from_secs(30));
        let token = mint(&f.codec, 60);

        f.clock.advance(Duration::from_secs(75));
        assert!(f.validator.is_valid(&token).await);

        f.clock.advance(Duration::from_secs(15));
        assert!(!f.validator.is_valid(&token).await);
    }

    #[tokio::test]
    async fn test_revoke_then_validate() {
        let f = fixture(Duration::ZERO);
        let token = mint(&f.codec, 3600);

        f.validator.revoke(&token).await.unwrap();

        assert!(!f.validator.is_valid(&token).await);
        assert!(matches!(
            f.validator.check(&token).await,
            Err(AuthError::TokenRevoked)
        ));
        assert_eq!(
            f.cache.ttl(&revoked_token_key(&token)),
            Some(Duration::from_secs(3600))
        );
    }

    #[tokio::test]
    async fn test_revocation_entry_lives_for_remaining_lifetime() {
        let f = fixture(Duration::ZERO);
        let token = mint(&f.codec, 3600);

        f.clock.advance(Duration::from_secs(600));
        f.validator.revoke(&token).await.unwrap();
        assert_eq!(
            f.cache.ttl(&revoked_token_key(&token)),
            Some(Duration::from_secs(3000))
        );

        f.clock.advance(Duration::from_secs(3000));
        assert!(!f.cache.exists(&revoked_token_key(&token)).await.unwrap());
    }

    #[tokio::test]
    async fn test_revocation_entry_never_outlives_expiry() {
        let clock = Arc::new(ManualClock::new(datetime!(2024-01-01 0:00:00.9 UTC)));
        let cache = Arc::new(MemoryRevocationCache::with_clock(clock.clone()));
        let codec = TokenCodec::new(SECRET, clock.clone()).unwrap();
        let validator = TokenValidator::new(codec.clone(), cache.clone(), Duration::ZERO);

        let token = mint(&codec, 3600);
        let key = revoked_token_key(&token);
        validator.revoke(&token).await.unwrap();
        assert_eq!(cache.ttl(&key), Some(Duration::from_millis(3_599_100)));

        clock.set(datetime!(2024-01-01 0:59:59.5 UTC));
        assert!(cache.exists(&key).await.unwrap());

        clock.set(datetime!(2024-01-01 1:00 UTC));
        assert!(!cache.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_expired_token_is_noop() {
        let f = fixture(Duration::ZERO);
        let token = mint(&f.codec, 60);

        f.clock.advance(Duration::from_secs(61));
        f.validator.revoke(&token).await.unwrap();
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_revoke_garbage_is_noop() {
        let f = fixture(Duration::ZERO);
        f.validator.revoke("garbage").await.unwrap();
        f.validator.revoke("").await.unwrap();
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let f = fixture(Duration::ZERO);
        let token = mint(&f.codec, 3600);
        f.validator.revoke(&token).await.unwrap();
        f.validator.revoke(&token).await.unwrap();
        assert_eq!(f.cache.len(), 1);
    }
}
