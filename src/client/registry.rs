//! Registered OAuth clients and the registry they are resolved from.

use crate::config::SignatureAlgorithm;
use crate::error::TokenError;
use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Token endpoint client authentication methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthenticationMethod {
    /// Public client, no credentials.
    None,
    /// Client secret via HTTP Basic.
    ClientSecretBasic,
    /// Client secret in the request body.
    ClientSecretPost,
    /// Client assertion JWT signed with a private key.
    PrivateKeyJwt,
}

impl ClientAuthenticationMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
            Self::PrivateKeyJwt => "private_key_jwt",
        }
    }
}

impl fmt::Display for ClientAuthenticationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientAuthenticationMethod {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "client_secret_basic" => Ok(Self::ClientSecretBasic),
            "client_secret_post" => Ok(Self::ClientSecretPost),
            "private_key_jwt" => Ok(Self::PrivateKeyJwt),
            other => Err(TokenError::invalid_client(format!(
                "Unknown authentication method: {}",
                other
            ))),
        }
    }
}

/// OAuth grant types handled by the token pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationGrantType {
    AuthorizationCode,
    RefreshToken,
}

impl AuthorizationGrantType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for AuthorizationGrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorizationGrantType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "refresh_token" => Ok(Self::RefreshToken),
            other => Err(TokenError::invalid_client(format!(
                "Unsupported grant type: {}",
                other
            ))),
        }
    }
}

/// Access token representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenFormat {
    /// Signed JWT carrying its own claims.
    #[default]
    SelfContained,
    /// Opaque handle resolved by introspection.
    Reference,
}

/// Per-client token lifetimes and formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    pub access_token_ttl: Duration,
    /// Carried for completeness; refresh token expiry is derived from
    /// `access_token_ttl`.
    pub refresh_token_ttl: Duration,
    pub access_token_format: AccessTokenFormat,
    pub id_token_signature_algorithm: Option<SignatureAlgorithm>,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::minutes(5),
            refresh_token_ttl: Duration::minutes(60),
            access_token_format: AccessTokenFormat::SelfContained,
            id_token_signature_algorithm: None,
        }
    }
}

/// A client known to the authorization server. Read-only here.
#[derive(Clone)]
pub struct RegisteredClient {
    client_id: String,
    client_secret: Option<String>,
    client_authentication_methods: HashSet<ClientAuthenticationMethod>,
    authorization_grant_types: HashSet<AuthorizationGrantType>,
    scopes: BTreeSet<String>,
    token_settings: TokenSettings,
}

impl RegisteredClient {
    /// Start building a client.
    #[must_use]
    pub fn builder(client_id: impl Into<String>) -> RegisteredClientBuilder {
        RegisteredClientBuilder {
            client_id: client_id.into(),
            client_secret: None,
            client_authentication_methods: HashSet::new(),
            authorization_grant_types: HashSet::new(),
            scopes: BTreeSet::new(),
            token_settings: TokenSettings::default(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn client_authentication_methods(&self) -> &HashSet<ClientAuthenticationMethod> {
        &self.client_authentication_methods
    }

    pub fn authorization_grant_types(&self) -> &HashSet<AuthorizationGrantType> {
        &self.authorization_grant_types
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn token_settings(&self) -> &TokenSettings {
        &self.token_settings
    }

    pub fn allows_authentication_method(&self, method: ClientAuthenticationMethod) -> bool {
        self.client_authentication_methods.contains(&method)
    }

    pub fn allows_grant_type(&self, grant_type: AuthorizationGrantType) -> bool {
        self.authorization_grant_types.contains(&grant_type)
    }
}

impl fmt::Debug for RegisteredClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredClient")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("client_authentication_methods", &self.client_authentication_methods)
            .field("authorization_grant_types", &self.authorization_grant_types)
            .field("scopes", &self.scopes)
            .field("token_settings", &self.token_settings)
            .finish()
    }
}

/// Builder for [`RegisteredClient`].
pub struct RegisteredClientBuilder {
    client_id: String,
    client_secret: Option<String>,
    client_authentication_methods: HashSet<ClientAuthenticationMethod>,
    authorization_grant_types: HashSet<AuthorizationGrantType>,
    scopes: BTreeSet<String>,
    token_settings: TokenSettings,
}

impl RegisteredClientBuilder {
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn authentication_method(mut self, method: ClientAuthenticationMethod) -> Self {
        self.client_authentication_methods.insert(method);
        self
    }

    pub fn grant_type(mut self, grant_type: AuthorizationGrantType) -> Self {
        self.authorization_grant_types.insert(grant_type);
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.insert(scope.into());
        self
    }

    pub fn token_settings(mut self, settings: TokenSettings) -> Self {
        self.token_settings = settings;
        self
    }

    pub fn access_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_settings.access_token_ttl = ttl;
        self
    }

    pub fn access_token_format(mut self, format: AccessTokenFormat) -> Self {
        self.token_settings.access_token_format = format;
        self
    }

    pub fn id_token_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.token_settings.id_token_signature_algorithm = Some(algorithm);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the client id is blank, no authentication method
    /// or grant type is allowed, or the access token TTL is under one second.
    pub fn build(self) -> Result<RegisteredClient, TokenError> {
        if self.client_id.trim().is_empty() {
            return Err(TokenError::config("client id cannot be empty"));
        }
        if self.client_authentication_methods.is_empty() {
            return Err(TokenError::config(format!(
                "client {} has no authentication method",
                self.client_id
            )));
        }
        if self.authorization_grant_types.is_empty() {
            return Err(TokenError::config(format!(
                "client {} has no grant type",
                self.client_id
            )));
        }
        // exp and iat are whole seconds; anything shorter collapses exp onto iat.
        if self.token_settings.access_token_ttl < Duration::seconds(1) {
            return Err(TokenError::config(format!(
                "client {} access token TTL must be at least one second",
                self.client_id
            )));
        }

        Ok(RegisteredClient {
            client_id: self.client_id,
            client_secret: self.client_secret,
            client_authentication_methods: self.client_authentication_methods,
            authorization_grant_types: self.authorization_grant_types,
            scopes: self.scopes,
            token_settings: self.token_settings,
        })
    }
}

/// Source of registered clients.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Look up a client by id.
    async fn find_by_client_id(&self, client_id: &str) -> Option<RegisteredClient>;
}

/// Fixed set of clients held in memory.
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    clients: HashMap<String, RegisteredClient>,
}

impl InMemoryClientRegistry {
    pub fn new(clients: impl IntoIterator<Item = RegisteredClient>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|c| (c.client_id().to_string(), c))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn find_by_client_id(&self, client_id: &str) -> Option<RegisteredClient> {
        self.clients.get(client_id).cloned()
    }
}
