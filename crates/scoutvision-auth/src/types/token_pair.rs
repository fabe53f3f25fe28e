//! Token pair returned by authenticate and refresh.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Token type reported to callers.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Access token plus refresh token, as returned on the wire.
///
/// ```json
/// {
///   "accessToken": "eyJ...",
///   "refreshToken": "q3N...",
///   "expiresAt": "2024-01-01T01:00:00Z",
///   "tokenType": "Bearer"
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Signed three-part access token.
    pub access_token: String,

    /// Opaque single-use refresh token.
    pub refresh_token: String,

    /// Absolute expiry of the access token.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Always `"Bearer"`.
    pub token_type: String,
}

impl TokenPair {
    /// Creates a bearer token pair.
    #[must_use]
    pub fn bearer(
        access_token: String,
        refresh_token: String,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}

// Token values stay out of logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Response envelope used at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Human-readable outcome. Generic on failure.
    pub message: String,

    /// The issued pair on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TokenPair>,
}

impl AuthResponse {
    /// Successful response carrying a token pair.
    #[must_use]
    pub fn success(pair: TokenPair) -> Self {
        Self {
            success: true,
            message: "authenticated".to_string(),
            data: Some(pair),
        }
    }

    /// Failed response. Carries only the public error code.
    #[must_use]
    pub fn failure(err: &crate::AuthError) -> Self {
        Self {
            success: false,
            message: err.public_code().to_string(),
            data: None,
        }
    }
}
