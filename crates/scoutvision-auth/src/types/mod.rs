//! Types shared across the token components.
//!
//! ## Domain Types
//!
//! - [`SubjectClaims`] - Claims supplied by the identity source
//! - [`TokenPair`] - Access/refresh pair returned to callers
//! - [`AuthResponse`] - Response envelope used at the API boundary
//! - [`refresh_token`] - Refresh token value generation

pub mod claims;
pub mod refresh_token;
pub mod token_pair;

pub use claims::SubjectClaims;
pub use token_pair::{AuthResponse, TOKEN_TYPE_BEARER, TokenPair};
