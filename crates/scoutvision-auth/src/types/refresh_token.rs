//! Refresh token values.
//!
//! A refresh token is an opaque random string. It carries no state of its
//! own: whether it is still usable is decided solely by the revocation cache.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Number of random bytes in a refresh token (512 bits).
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// Generates a cryptographically secure refresh token.
///
/// Returns 512 random bits from the OS generator, encoded as base64url
/// without padding (86 characters).
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
