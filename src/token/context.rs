//! Per-request input to token generation.

use crate::client::registry::{AuthorizationGrantType, RegisteredClient};
use crate::jwt::claims::ClaimsSet;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of token being minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Access,
    Id,
    Refresh,
}

impl TokenType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Id => "id_token",
            Self::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: String,
    username: String,
    authorities: Vec<String>,
}

impl Principal {
    /// `user_id` is the stable identifier placed in `sub`.
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            authorities: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_authorities<I, S>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorities = authorities.into_iter().map(Into::into).collect();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }
}

/// Login session the authorization was granted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInformation {
    pub session_id: String,
    pub last_request: DateTime<Utc>,
}

impl SessionInformation {
    pub fn new(session_id: impl Into<String>, last_request: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            last_request,
        }
    }
}

/// The stored authorization request, as far as token generation cares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorizationRequest {
    pub additional_parameters: Map<String, Value>,
}

impl AuthorizationRequest {
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_parameters.insert(name.into(), value.into());
        self
    }

    /// Non-blank `nonce` parameter.
    pub fn nonce(&self) -> Option<&str> {
        self.additional_parameters
            .get("nonce")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
    }
}

/// State of the authorization being served, from the authorization store.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationAttributes {
    authorization_request: Option<AuthorizationRequest>,
    session: Option<SessionInformation>,
    previous_id_token: Option<ClaimsSet>,
}

impl AuthorizationAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_authorization_request(mut self, request: AuthorizationRequest) -> Self {
        self.authorization_request = Some(request);
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionInformation) -> Self {
        self.session = Some(session);
        self
    }

    /// Claims of the ID token issued earlier for this authorization.
    #[must_use]
    pub fn with_previous_id_token(mut self, claims: ClaimsSet) -> Self {
        self.previous_id_token = Some(claims);
        self
    }

    pub fn authorization_request(&self) -> Option<&AuthorizationRequest> {
        self.authorization_request.as_ref()
    }

    pub fn session(&self) -> Option<&SessionInformation> {
        self.session.as_ref()
    }

    pub fn previous_id_token(&self) -> Option<&ClaimsSet> {
        self.previous_id_token.as_ref()
    }
}

/// Everything a generator needs to mint one token. Immutable once built.
#[derive(Debug, Clone)]
pub struct TokenRequestContext {
    token_type: TokenType,
    grant_type: AuthorizationGrantType,
    registered_client: RegisteredClient,
    principal: Principal,
    authorized_scopes: BTreeSet<String>,
    attributes: AuthorizationAttributes,
    issuer: Option<String>,
}

impl TokenRequestContext {
    pub fn builder(
        token_type: TokenType,
        grant_type: AuthorizationGrantType,
        registered_client: RegisteredClient,
        principal: Principal,
    ) -> TokenRequestContextBuilder {
        TokenRequestContextBuilder {
            context: Self {
                token_type,
                grant_type,
                registered_client,
                principal,
                authorized_scopes: BTreeSet::new(),
                attributes: AuthorizationAttributes::default(),
                issuer: None,
            },
        }
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn grant_type(&self) -> AuthorizationGrantType {
        self.grant_type
    }

    pub fn registered_client(&self) -> &RegisteredClient {
        &self.registered_client
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn authorized_scopes(&self) -> &BTreeSet<String> {
        &self.authorized_scopes
    }

    pub fn attributes(&self) -> &AuthorizationAttributes {
        &self.attributes
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Same request for a different token type, e.g. the ID token minted
    /// alongside an access token.
    #[must_use]
    pub fn for_token_type(&self, token_type: TokenType) -> Self {
        Self {
            token_type,
            ..self.clone()
        }
    }
}

/// Builder for [`TokenRequestContext`].
pub struct TokenRequestContextBuilder {
    context: TokenRequestContext,
}

impl TokenRequestContextBuilder {
    #[must_use]
    pub fn authorized_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.authorized_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: AuthorizationAttributes) -> Self {
        self.context.attributes = attributes;
        self
    }

    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.context.issuer = Some(issuer.into());
        self
    }

    pub fn build(self) -> TokenRequestContext {
        self.context
    }
}
