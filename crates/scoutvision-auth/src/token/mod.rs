//! Token generation, validation, rotation and revocation.
//!
//! This module provides:
//!
//! - HS256 access token encoding and decoding ([`codec`])
//! - Token pair issuance ([`issuer`])
//! - Validation against the revocation ledger ([`validator`])
//! - Single-use refresh token rotation ([`refresh`])

pub mod claims;
pub mod codec;
pub mod issuer;
pub mod refresh;
pub mod validator;

pub use claims::AccessTokenClaims;
pub use codec::{CodecError, TokenCodec};
pub use issuer::TokenIssuer;
pub use refresh::RefreshCoordinator;
pub use validator::TokenValidator;
