//! Opaque refresh tokens.

pub mod issuer;
pub mod token;

pub use issuer::{RefreshTokenIssuer, REFRESH_TOKEN_BYTES};
pub use token::OpaqueRefreshToken;
