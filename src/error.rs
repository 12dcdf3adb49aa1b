//! Error types for the token pipeline.
//!
//! Every failure path returns a typed [`TokenError`]. Callers at the
//! protocol layer translate these into OAuth error responses using
//! [`TokenError::error_code`].

use thiserror::Error;

/// Errors raised while provisioning keys, authenticating clients or minting tokens.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signing key could not be loaded, decoded, generated or persisted.
    #[error("Key provisioning error: {0}")]
    KeyProvisioning(String),

    /// Unknown client or disallowed authentication method / grant type.
    #[error("Invalid client: {0}")]
    InvalidClient(String),

    /// No generator accepted the requested token type.
    #[error("Unsupported token type: {0}")]
    UnsupportedTokenType(String),

    /// JWT signing failed.
    #[error("JWT signing error: {0}")]
    Signing(String),

    /// JWT signature or claim verification failed.
    #[error("JWT verification error: {0}")]
    Verification(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TokenError {
    /// Create a key provisioning error.
    #[must_use]
    pub fn key_provisioning(msg: impl Into<String>) -> Self {
        Self::KeyProvisioning(msg.into())
    }

    /// Create an invalid client error.
    #[must_use]
    pub fn invalid_client(msg: impl Into<String>) -> Self {
        Self::InvalidClient(msg.into())
    }

    /// Create an unsupported token type error.
    #[must_use]
    pub fn unsupported_token_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedTokenType(msg.into())
    }

    /// Create a signing error.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Create a verification error.
    #[must_use]
    pub fn verification(msg: impl Into<String>) -> Self {
        Self::Verification(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether retrying the same operation could succeed.
    ///
    /// None of the pipeline's failures are transient: a missing key, an
    /// unknown client or a misconfigured generator chain stays broken until
    /// someone fixes it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// OAuth 2.0 error code for protocol responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient(_) => INVALID_CLIENT,
            Self::Verification(_) => INVALID_TOKEN,
            Self::KeyProvisioning(_)
            | Self::UnsupportedTokenType(_)
            | Self::Signing(_)
            | Self::Config(_) => SERVER_ERROR,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        TokenError::Signing(err.to_string())
    }
}

/// OAuth error code for client authentication failures.
pub const INVALID_CLIENT: &str = "invalid_client";
/// OAuth error code for tokens that fail verification.
pub const INVALID_TOKEN: &str = "invalid_token";
/// OAuth error code for internal failures.
pub const SERVER_ERROR: &str = "server_error";
