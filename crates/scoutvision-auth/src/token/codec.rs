//! HS256 access token encoding and verification.
//!
//! Tokens use the standard three-part JWT wire format signed with
//! HMAC-SHA-256 over a shared secret. [`TokenCodec::decode`] verifies the
//! signature and structure but deliberately leaves expiry to
//! [`TokenCodec::check_expiry`], so callers can read claims from an expired
//! token (revocation, refresh with an expired access token) while still
//! rejecting forgeries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use time::OffsetDateTime;

use super::claims::AccessTokenClaims;
use crate::clock::Clock;
use crate::config::MIN_SECRET_LEN;
use crate::error::AuthError;
use crate::types::SubjectClaims;

/// Errors raised while encoding or decoding access tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The signature does not match the header and claims.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("Token expired")]
    Expired,

    /// The token is not a well-formed HS256 JWT with the expected claims.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// Signing failed.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },
}

impl CodecError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::malformed(err.to_string()),
        }
    }
}

/// Signs and verifies access tokens.
///
/// Holds only the derived keys and the clock; it never touches the cache.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec for the given secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the secret is empty or shorter
    /// than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::configuration("signing secret is not set"));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::configuration(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        })
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Mints a signed access token for `subject` valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encoding` if signing fails or the expiry falls
    /// outside the representable date range.
    pub fn issue(
        &self,
        subject: &str,
        claims: &SubjectClaims,
        ttl: Duration,
    ) -> Result<(String, AccessTokenClaims), CodecError> {
        let claims = AccessTokenClaims::new(subject, claims, self.clock.now(), ttl);
        if OffsetDateTime::from_unix_timestamp(claims.exp).is_err() {
            return Err(CodecError::Encoding {
                message: format!("token lifetime {ttl:?} is out of range"),
            });
        }
        let token = self.encode(&claims)?;
        Ok((token, claims))
    }

    /// Signs the given claims.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encoding` if signing fails.
    pub fn encode(&self, claims: &AccessTokenClaims) -> Result<String, CodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            CodecError::Encoding {
                message: e.to_string(),
            }
        })
    }

    /// Verifies the signature and structure of `token` and returns its
    /// claims. Expiry is not checked.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidSignature` on signature mismatch and
    /// `CodecError::Malformed` for anything that does not parse, including a
    /// header algorithm other than HS256.
    pub fn decode(&self, token: &str) -> Result<AccessTokenClaims, CodecError> {
        if token.is_empty() {
            return Err(CodecError::malformed("empty token"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(CodecError::from)
    }

    /// Fails with `CodecError::Expired` if `claims` are past expiry at `now`,
    /// tolerating `leeway` of clock skew.
    ///
    /// The boundary is inclusive: a token is already expired at the instant
    /// `exp + leeway`, one second earlier than `jsonwebtoken`'s own
    /// `exp < now` check would reject it. This matches the revocation TTL,
    /// which is zero at that same instant.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Expired` when `now >= exp + leeway`.
    pub fn check_expiry(
        claims: &AccessTokenClaims,
        now: OffsetDateTime,
        leeway: Duration,
    ) -> Result<(), CodecError> {
        let leeway = i64::try_from(leeway.as_secs()).unwrap_or(i64::MAX);
        if now.unix_timestamp() >= claims.exp.saturating_add(leeway) {
            return Err(CodecError::Expired);
        }
        Ok(())
    }

    /// Decodes `token` and checks expiry against the injected clock.
    ///
    /// # Errors
    ///
    /// Any error from [`decode`](Self::decode) or
    /// [`check_expiry`](Self::check_expiry).
    pub fn decode_unexpired(
        &self,
        token: &str,
        leeway: Duration,
    ) -> Result<AccessTokenClaims, CodecError> {
        let claims = self.decode(token)?;
        Self::check_expiry(&claims, self.clock.now(), leeway)?;
        Ok(claims)
    }
}
