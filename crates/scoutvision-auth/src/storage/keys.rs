//! Cache key layout.

/// Prefix for revoked access tokens.
pub const REVOKED_TOKEN_PREFIX: &str = "revoked_token:";

/// Prefix for live refresh tokens.
pub const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";

/// Prefix for fencing markers written when a refresh token is consumed on a
/// backend without atomic get-and-delete.
pub const CONSUMED_PREFIX: &str = "consumed:";

/// Key marking an access token as revoked.
#[must_use]
pub fn revoked_token_key(access_token: &str) -> String {
    format!("{REVOKED_TOKEN_PREFIX}{access_token}")
}

/// Key holding a live refresh token owned by `subject`.
#[must_use]
pub fn refresh_token_key(subject: &str, refresh_token: &str) -> String {
    format!("{REFRESH_TOKEN_PREFIX}{subject}:{refresh_token}")
}

/// Fencing marker for a consumed refresh token.
#[must_use]
pub fn consumed_marker_key(refresh_token: &str) -> String {
    format!("{CONSUMED_PREFIX}{refresh_token}")
}
