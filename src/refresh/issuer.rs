use crate::error::TokenError;
use crate::refresh::token::OpaqueRefreshToken;
use crate::token::context::{TokenRequestContext, TokenType};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes per refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Mints opaque refresh tokens. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshTokenIssuer;

impl RefreshTokenIssuer {
    pub fn new() -> Self {
        Self
    }

    /// `Ok(None)` unless the context asks for a refresh token.
    ///
    /// The token expires after the client's access token TTL.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the TTL overflows the calendar.
    pub fn issue(&self, context: &TokenRequestContext) -> Result<Option<OpaqueRefreshToken>, TokenError> {
        self.issue_at(context, Utc::now())
    }

    /// As [`Self::issue`], issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// See [`Self::issue`].
    pub fn issue_at(
        &self,
        context: &TokenRequestContext,
        issued_at: DateTime<Utc>,
    ) -> Result<Option<OpaqueRefreshToken>, TokenError> {
        if context.token_type() != TokenType::Refresh {
            return Ok(None);
        }

        let client = context.registered_client();
        let ttl = client.token_settings().access_token_ttl;
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            TokenError::config(format!(
                "client {} token TTL out of range",
                client.client_id()
            ))
        })?;

        Ok(Some(OpaqueRefreshToken::new(
            Self::generate_value(),
            issued_at,
            expires_at,
        )))
    }

    fn generate_value() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
