//! Routes token requests to the generator for their token type.

use crate::config::Config;
use crate::error::TokenError;
use crate::jwt::customizer::{AuthoritiesCustomizer, TokenCustomizer};
use crate::jwt::generator::JwtGenerator;
use crate::keys::provider::KeyMaterialProvider;
use crate::metrics;
use crate::refresh::issuer::RefreshTokenIssuer;
use crate::token::context::{TokenRequestContext, TokenType};
use crate::token::issued::IssuedToken;
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point for minting tokens.
///
/// Access and ID tokens go through the JWT generator, refresh tokens
/// through the refresh issuer. Cheap to clone and safe to share.
#[derive(Clone)]
pub struct TokenDispatcher {
    jwt: JwtGenerator,
    refresh: RefreshTokenIssuer,
}

impl TokenDispatcher {
    /// Dispatcher with the default [`AuthoritiesCustomizer`].
    pub fn new(keys: Arc<KeyMaterialProvider>) -> Self {
        Self {
            jwt: JwtGenerator::new(keys).with_customizer(Arc::new(AuthoritiesCustomizer)),
            refresh: RefreshTokenIssuer::new(),
        }
    }

    /// Dispatcher stamping the configured `JWT_ISSUER` on tokens whose
    /// request carries no issuer.
    pub fn from_config(keys: Arc<KeyMaterialProvider>, config: &Config) -> Self {
        let dispatcher = Self::new(keys);
        match &config.issuer {
            Some(issuer) => dispatcher.with_issuer(issuer.clone()),
            None => dispatcher,
        }
    }

    /// Default `iss` for requests without one.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.jwt = self.jwt.with_issuer(issuer);
        self
    }

    pub fn issuer(&self) -> Option<&str> {
        self.jwt.issuer()
    }

    /// Replace the claim customizer.
    #[must_use]
    pub fn with_customizer(mut self, customizer: Arc<dyn TokenCustomizer>) -> Self {
        self.jwt = self.jwt.with_customizer(customizer);
        self
    }

    /// Mint the token described by `context`.
    ///
    /// # Errors
    ///
    /// - `InvalidClient` if the client may not use the request's grant type
    /// - `UnsupportedTokenType` if the generator for the token type declines
    /// - `Signing` / `Config` from the generators
    pub fn generate(&self, context: &TokenRequestContext) -> Result<IssuedToken, TokenError> {
        let client = context.registered_client();
        if !client.allows_grant_type(context.grant_type()) {
            warn!(
                client_id = %client.client_id(),
                grant_type = %context.grant_type(),
                "Grant type not allowed for client"
            );
            return Err(TokenError::invalid_client(format!(
                "grant type {} not allowed",
                context.grant_type()
            )));
        }

        let token_type = context.token_type();
        let issued = match token_type {
            TokenType::Access | TokenType::Id => self.jwt.generate(context)?.map(IssuedToken::Jwt),
            TokenType::Refresh => {
                let token = self.refresh.issue(context)?;
                if token.is_some() {
                    metrics::record_token_issued(token_type.as_str(), "none");
                    info!(client_id = %client.client_id(), "Issued refresh token");
                }
                token.map(IssuedToken::Refresh)
            }
        };

        issued.ok_or_else(|| {
            TokenError::unsupported_token_type(format!(
                "{} not available for client {}",
                token_type,
                client.client_id()
            ))
        })
    }
}
