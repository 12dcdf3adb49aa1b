//! Claims assembly for access and ID tokens.
//!
//! The claim set depends on the token type and, for ID tokens, on the
//! grant: an authorization-code exchange takes `nonce` and session data from
//! the authorization request, while a refresh carries `sid` and `auth_time`
//! forward from the ID token being replaced.

use crate::client::registry::{AccessTokenFormat, AuthorizationGrantType};
use crate::config::SignatureAlgorithm;
use crate::error::TokenError;
use crate::jwt::claims::{names, ClaimsBuilder, ClaimsSet};
use crate::jwt::customizer::TokenCustomizer;
use crate::jwt::header::{JwsHeader, JwsHeaderBuilder};
use crate::token::context::{TokenRequestContext, TokenType};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// ID tokens always live for 30 minutes.
pub const ID_TOKEN_TTL_MINUTES: i64 = 30;

/// Header and claims ready for signing.
#[derive(Debug, Clone)]
pub struct UnsignedToken {
    pub header: JwsHeader,
    pub claims: ClaimsSet,
}

/// Builds claim sets for self-contained access tokens and ID tokens.
#[derive(Clone, Default)]
pub struct ClaimsAssembler {
    customizer: Option<Arc<dyn TokenCustomizer>>,
    issuer: Option<String>,
}

impl ClaimsAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_customizer(mut self, customizer: Arc<dyn TokenCustomizer>) -> Self {
        self.customizer = Some(customizer);
        self
    }

    /// `iss` for requests whose context carries no issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Assemble claims issued now.
    ///
    /// Returns `Ok(None)` for refresh tokens and for access tokens of
    /// clients using reference-format access tokens.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the client's access token TTL overflows the
    /// calendar.
    pub fn assemble(&self, context: &TokenRequestContext) -> Result<Option<UnsignedToken>, TokenError> {
        self.assemble_at(context, Utc::now())
    }

    /// Assemble claims as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// See [`Self::assemble`].
    pub fn assemble_at(
        &self,
        context: &TokenRequestContext,
        issued_at: DateTime<Utc>,
    ) -> Result<Option<UnsignedToken>, TokenError> {
        let token_type = context.token_type();
        let client = context.registered_client();
        let settings = client.token_settings();

        match token_type {
            TokenType::Refresh => return Ok(None),
            TokenType::Access if settings.access_token_format != AccessTokenFormat::SelfContained => {
                debug!(
                    client_id = %client.client_id(),
                    "Access token format is not self-contained, declining"
                );
                return Ok(None);
            }
            TokenType::Access | TokenType::Id => {}
        }

        let (ttl, algorithm) = if token_type == TokenType::Id {
            (
                Duration::minutes(ID_TOKEN_TTL_MINUTES),
                settings.id_token_signature_algorithm.unwrap_or_default(),
            )
        } else {
            (settings.access_token_ttl, SignatureAlgorithm::RS256)
        };
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            TokenError::config(format!(
                "client {} token TTL out of range",
                client.client_id()
            ))
        })?;

        let mut claims = ClaimsBuilder::new();
        let issuer = context
            .issuer()
            .filter(|i| !i.trim().is_empty())
            .or_else(|| self.issuer.as_deref().filter(|i| !i.trim().is_empty()));
        if let Some(issuer) = issuer {
            claims.issuer(issuer);
        }
        claims
            .subject(context.principal().user_id())
            .audience(vec![client.client_id().to_string()])
            .issued_at(issued_at)
            .expires_at(expires_at)
            .id(uuid::Uuid::new_v4().to_string());

        if token_type == TokenType::Access {
            claims.not_before(issued_at);
            let scopes = context.authorized_scopes();
            if !scopes.is_empty() {
                claims.claim(names::SCOPE, scopes.iter().cloned().collect::<Vec<_>>());
            }
        } else {
            claims.claim(names::AZP, client.client_id());
            Self::add_id_token_session_claims(context, &mut claims);
        }

        let mut header = JwsHeader::with(algorithm);
        self.customize(context, &mut claims, &mut header);

        Ok(Some(UnsignedToken {
            header: header.build(),
            claims: claims.build(),
        }))
    }

    fn add_id_token_session_claims(context: &TokenRequestContext, claims: &mut ClaimsBuilder) {
        let attributes = context.attributes();
        match context.grant_type() {
            AuthorizationGrantType::AuthorizationCode => {
                if let Some(nonce) = attributes.authorization_request().and_then(|r| r.nonce()) {
                    claims.claim(names::NONCE, nonce);
                }
                if let Some(session) = attributes.session() {
                    claims
                        .claim(names::SID, session.session_id.as_str())
                        .claim(names::AUTH_TIME, session.last_request.timestamp());
                }
            }
            AuthorizationGrantType::RefreshToken => {
                if let Some(previous) = attributes.previous_id_token() {
                    for name in [names::SID, names::AUTH_TIME] {
                        if let Some(value) = previous.get(name) {
                            claims.claim(name, value.clone());
                        }
                    }
                }
            }
        }
    }

    fn customize(
        &self,
        context: &TokenRequestContext,
        claims: &mut ClaimsBuilder,
        header: &mut JwsHeaderBuilder,
    ) {
        if let Some(customizer) = &self.customizer {
            customizer.customize(context, claims, header);
        }
    }
}
