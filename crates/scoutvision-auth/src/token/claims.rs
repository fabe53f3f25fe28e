//! Access token claims.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::SubjectClaims;

/// Claims carried inside a signed access token.
///
/// Field names are the registered JWT claim names where one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user identifier).
    pub sub: String,

    /// Granted roles.
    pub roles: Vec<String>,

    /// Tenant the subject belongs to.
    pub tenant_id: String,

    /// Feature category.
    pub category: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Random nonce so two tokens minted in the same second differ.
    pub jti: String,
}

impl AccessTokenClaims {
    /// Builds claims for `subject` valid from `issued_at` for `ttl`.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        claims: &SubjectClaims,
        issued_at: OffsetDateTime,
        ttl: Duration,
    ) -> Self {
        let iat = issued_at.unix_timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            sub: subject.into(),
            roles: claims.roles.clone(),
            tenant_id: claims.tenant_id.clone(),
            category: claims.category.clone(),
            iat,
            exp: iat.saturating_add(ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// The caller-supplied part of the claims.
    #[must_use]
    pub fn subject_claims(&self) -> SubjectClaims {
        SubjectClaims {
            roles: self.roles.clone(),
            tenant_id: self.tenant_id.clone(),
            category: self.category.clone(),
        }
    }

    /// Issue time, or the Unix epoch if `iat` is out of range.
    #[must_use]
    pub fn issued_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.iat).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Expiry time, or the Unix epoch if `exp` is out of range.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Lifetime left at `now`, or zero once expired.
    ///
    /// Keeps sub-second precision: `now` is not rounded down to `iat`'s
    /// whole-second resolution.
    #[must_use]
    pub fn remaining(&self, now: OffsetDateTime) -> Duration {
        remaining_until(self.exp, now)
    }

    /// Returns `true` if the token is past `exp` at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() >= self.exp
    }
}

/// Time from `now` until the Unix timestamp `until`, or zero if it has passed.
pub(crate) fn remaining_until(until: i64, now: OffsetDateTime) -> Duration {
    let elapsed = now - OffsetDateTime::UNIX_EPOCH;
    Duration::try_from(time::Duration::seconds(until).saturating_sub(elapsed))
        .unwrap_or(Duration::ZERO)
}
