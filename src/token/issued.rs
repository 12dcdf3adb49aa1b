use crate::jwt::signer::SignedJwt;
use crate::refresh::token::OpaqueRefreshToken;
use chrono::{DateTime, Utc};

/// A token produced by the dispatcher.
#[derive(Debug, Clone)]
pub enum IssuedToken {
    /// Signed access or ID token.
    Jwt(SignedJwt),
    /// Opaque refresh token.
    Refresh(OpaqueRefreshToken),
}

impl IssuedToken {
    /// Serialized value handed to the client.
    pub fn token_value(&self) -> &str {
        match self {
            Self::Jwt(jwt) => jwt.token_value(),
            Self::Refresh(token) => token.token_value(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Jwt(jwt) => jwt.claims().issued_at(),
            Self::Refresh(token) => Some(token.issued_at()),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Jwt(jwt) => jwt.claims().expires_at(),
            Self::Refresh(token) => Some(token.expires_at()),
        }
    }

    pub fn as_jwt(&self) -> Option<&SignedJwt> {
        match self {
            Self::Jwt(jwt) => Some(jwt),
            Self::Refresh(_) => None,
        }
    }

    pub fn as_refresh(&self) -> Option<&OpaqueRefreshToken> {
        match self {
            Self::Refresh(token) => Some(token),
            Self::Jwt(_) => None,
        }
    }
}
