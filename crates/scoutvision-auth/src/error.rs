//! Authentication error types.
//!
//! This module defines every error that token issuance, validation,
//! rotation and revocation can produce. Callers at the request boundary map
//! them to a single generic rejection via [`AuthError::public_code`].

use std::fmt;

use crate::storage::CacheError;
use crate::token::codec::CodecError;

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A request field is empty or malformed.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the offending field.
        message: String,
    },

    /// The service configuration is invalid (for example the signing secret
    /// is missing). Raised while constructing the service, never per request.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The token signature does not match its contents.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token structure could not be parsed.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// The access token is past its expiry.
    #[error("Token expired")]
    Expired,

    /// The access token was explicitly revoked.
    #[error("Token revoked")]
    TokenRevoked,

    /// The refresh token is absent, already consumed, or expired.
    #[error("Refresh token invalid")]
    RefreshTokenInvalid,

    /// The revocation cache could not be reached or timed out.
    #[error("Cache unavailable: {message}")]
    CacheUnavailable {
        /// Description of the backend failure.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `CacheUnavailable` error.
    #[must_use]
    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the error was caused by what the client presented.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::InvalidSignature
                | Self::Malformed { .. }
                | Self::Expired
                | Self::TokenRevoked
                | Self::RefreshTokenInvalid
        )
    }

    /// Returns `true` if this is a server-side failure.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::CacheUnavailable { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if this error concerns an access token.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature | Self::Malformed { .. } | Self::Expired | Self::TokenRevoked
        )
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::Validation,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::InvalidSignature => ErrorCategory::Token,
            Self::Malformed { .. } => ErrorCategory::Token,
            Self::Expired => ErrorCategory::Token,
            Self::TokenRevoked => ErrorCategory::Token,
            Self::RefreshTokenInvalid => ErrorCategory::Refresh,
            Self::CacheUnavailable { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the code shown to API callers.
    ///
    /// Every per-request failure collapses to `"unauthorized"` so callers
    /// cannot tell an expired token from a revoked or unknown one.
    #[must_use]
    pub fn public_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } | Self::Internal { .. } => "server_error",
            _ => "unauthorized",
        }
    }
}

impl From<CodecError> for AuthError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidSignature => Self::InvalidSignature,
            CodecError::Expired => Self::Expired,
            CodecError::Malformed { message } => Self::Malformed { message },
            CodecError::Encoding { message } => Self::Internal { message },
        }
    }
}

impl From<CacheError> for AuthError {
    fn from(err: CacheError) -> Self {
        Self::cache_unavailable(err.to_string())
    }
}

impl From<crate::config::ConfigError> for AuthError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

/// Categories of token errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request validation errors.
    Validation,
    /// Configuration errors.
    Configuration,
    /// Access token errors (signature, structure, expiry, revocation).
    Token,
    /// Refresh token rotation errors.
    Refresh,
    /// Cache backend errors.
    Infrastructure,
    /// Internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Configuration => write!(f, "configuration"),
            Self::Token => write!(f, "token"),
            Self::Refresh => write!(f, "refresh"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
