//! Client authentication at the token endpoint.
//!
//! Providers are composed in a [`ClientAuthenticationChain`]; each one
//! declares which inbound authentication it `supports` and the chain hands
//! the request to the first match. [`ClientAuthenticator`] serves public
//! clients redeeming refresh tokens without a secret, and
//! [`ClientSecretAuthenticator`] serves confidential clients.

use crate::client::registry::{
    AuthorizationGrantType, ClientAuthenticationMethod, ClientRegistry, RegisteredClient,
};
use crate::error::TokenError;
use crate::metrics;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Public-client credentials presented on a refresh-token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAssertion {
    client_id: String,
    authentication_method: ClientAuthenticationMethod,
}

impl ClientAssertion {
    pub fn new(client_id: impl Into<String>, authentication_method: ClientAuthenticationMethod) -> Self {
        Self {
            client_id: client_id.into(),
            authentication_method,
        }
    }

    /// Convert token endpoint form parameters.
    ///
    /// Only a `refresh_token` grant carrying a `client_id` and no
    /// `client_secret` yields an assertion; everything else belongs to
    /// another provider.
    pub fn from_token_request(params: &HashMap<String, String>) -> Option<Self> {
        let grant_type = params.get("grant_type")?;
        if grant_type != AuthorizationGrantType::RefreshToken.as_str() {
            return None;
        }
        if params.contains_key("client_secret") {
            return None;
        }
        let client_id = params.get("client_id").map(|s| s.trim()).filter(|s| !s.is_empty())?;
        Some(Self::new(client_id, ClientAuthenticationMethod::None))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn authentication_method(&self) -> ClientAuthenticationMethod {
        self.authentication_method
    }
}

/// Inbound client authentication, before validation.
#[derive(Clone)]
pub enum ClientAuthentication {
    /// Public client assertion (refresh-token grant without a secret).
    PublicClient(ClientAssertion),
    /// Client id and secret via HTTP Basic or form body.
    ClientSecret {
        client_id: String,
        client_secret: Zeroizing<String>,
        method: ClientAuthenticationMethod,
    },
}

impl ClientAuthentication {
    pub fn client_id(&self) -> &str {
        match self {
            Self::PublicClient(assertion) => assertion.client_id(),
            Self::ClientSecret { client_id, .. } => client_id,
        }
    }

    pub fn method(&self) -> ClientAuthenticationMethod {
        match self {
            Self::PublicClient(assertion) => assertion.authentication_method(),
            Self::ClientSecret { method, .. } => *method,
        }
    }
}

/// A client that passed authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    registered_client: RegisteredClient,
    authentication_method: ClientAuthenticationMethod,
}

impl AuthenticatedClient {
    pub fn registered_client(&self) -> &RegisteredClient {
        &self.registered_client
    }

    pub fn authentication_method(&self) -> ClientAuthenticationMethod {
        self.authentication_method
    }

    pub fn into_registered_client(self) -> RegisteredClient {
        self.registered_client
    }
}

/// One link in the client authentication chain.
#[async_trait]
pub trait ClientAuthenticationProvider: Send + Sync {
    /// Whether this provider handles `authentication`.
    fn supports(&self, authentication: &ClientAuthentication) -> bool;

    /// Validate `authentication` against the client registry.
    async fn authenticate(
        &self,
        authentication: &ClientAuthentication,
    ) -> Result<AuthenticatedClient, TokenError>;
}

/// Authenticates public clients using method `none`.
///
/// No secret is compared; trust rests on the transport.
pub struct ClientAuthenticator {
    registry: Arc<dyn ClientRegistry>,
}

impl ClientAuthenticator {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve and validate a public client assertion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the declared method is not `none`, the
    /// client is unknown, or the client does not allow `none`.
    pub async fn authenticate_assertion(
        &self,
        assertion: &ClientAssertion,
    ) -> Result<AuthenticatedClient, TokenError> {
        let result = self.resolve(assertion).await;
        metrics::record_client_authentication(
            assertion.authentication_method().as_str(),
            result.is_ok(),
        );
        result
    }

    async fn resolve(&self, assertion: &ClientAssertion) -> Result<AuthenticatedClient, TokenError> {
        if assertion.authentication_method() != ClientAuthenticationMethod::None {
            warn!(
                client_id = %assertion.client_id(),
                method = %assertion.authentication_method(),
                "Rejected public client assertion with non-none method"
            );
            return Err(TokenError::invalid_client("authentication method not allowed"));
        }

        let registered_client = self
            .registry
            .find_by_client_id(assertion.client_id())
            .await
            .ok_or_else(|| {
                warn!(client_id = %assertion.client_id(), "Unknown client");
                TokenError::invalid_client("client not found")
            })?;

        if !registered_client.allows_authentication_method(ClientAuthenticationMethod::None) {
            warn!(
                client_id = %assertion.client_id(),
                "Client does not allow authentication method none"
            );
            return Err(TokenError::invalid_client("authentication method not allowed"));
        }

        debug!(client_id = %assertion.client_id(), "Authenticated public client");
        Ok(AuthenticatedClient {
            registered_client,
            authentication_method: ClientAuthenticationMethod::None,
        })
    }
}

#[async_trait]
impl ClientAuthenticationProvider for ClientAuthenticator {
    fn supports(&self, authentication: &ClientAuthentication) -> bool {
        matches!(authentication, ClientAuthentication::PublicClient(_))
    }

    async fn authenticate(
        &self,
        authentication: &ClientAuthentication,
    ) -> Result<AuthenticatedClient, TokenError> {
        match authentication {
            ClientAuthentication::PublicClient(assertion) => {
                self.authenticate_assertion(assertion).await
            }
            ClientAuthentication::ClientSecret { .. } => Err(TokenError::invalid_client(
                "unsupported client authentication",
            )),
        }
    }
}

/// Authenticates confidential clients by shared secret.
pub struct ClientSecretAuthenticator {
    registry: Arc<dyn ClientRegistry>,
}

impl ClientSecretAuthenticator {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }

    async fn verify(
        &self,
        client_id: &str,
        client_secret: &str,
        method: ClientAuthenticationMethod,
    ) -> Result<AuthenticatedClient, TokenError> {
        if !matches!(
            method,
            ClientAuthenticationMethod::ClientSecretBasic | ClientAuthenticationMethod::ClientSecretPost
        ) {
            return Err(TokenError::invalid_client("authentication method not allowed"));
        }

        let registered_client = self
            .registry
            .find_by_client_id(client_id)
            .await
            .ok_or_else(|| TokenError::invalid_client("client not found"))?;

        if !registered_client.allows_authentication_method(method) {
            return Err(TokenError::invalid_client("authentication method not allowed"));
        }

        let expected = registered_client
            .client_secret()
            .ok_or_else(|| TokenError::invalid_client("client has no secret"))?;
        let matches = expected.len() == client_secret.len()
            && bool::from(expected.as_bytes().ct_eq(client_secret.as_bytes()));
        if !matches {
            warn!(client_id = %client_id, "Client secret mismatch");
            return Err(TokenError::invalid_client("invalid client credentials"));
        }

        Ok(AuthenticatedClient {
            registered_client,
            authentication_method: method,
        })
    }
}

#[async_trait]
impl ClientAuthenticationProvider for ClientSecretAuthenticator {
    fn supports(&self, authentication: &ClientAuthentication) -> bool {
        matches!(authentication, ClientAuthentication::ClientSecret { .. })
    }

    async fn authenticate(
        &self,
        authentication: &ClientAuthentication,
    ) -> Result<AuthenticatedClient, TokenError> {
        let ClientAuthentication::ClientSecret {
            client_id,
            client_secret,
            method,
        } = authentication
        else {
            return Err(TokenError::invalid_client("unsupported client authentication"));
        };

        let result = self.verify(client_id, client_secret, *method).await;
        metrics::record_client_authentication(method.as_str(), result.is_ok());
        result
    }
}

/// Ordered client authentication providers; first supporting provider wins.
#[derive(Default)]
pub struct ClientAuthenticationChain {
    providers: Vec<Arc<dyn ClientAuthenticationProvider>>,
}

impl ClientAuthenticationChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain with the secret-based provider followed by the public-client one.
    pub fn standard(registry: Arc<dyn ClientRegistry>) -> Self {
        Self::new()
            .with_provider(Arc::new(ClientSecretAuthenticator::new(registry.clone())))
            .with_provider(Arc::new(ClientAuthenticator::new(registry)))
    }

    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ClientAuthenticationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Authenticate with the first provider that supports `authentication`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if no provider supports it, or whatever the
    /// chosen provider returns.
    pub async fn authenticate(
        &self,
        authentication: &ClientAuthentication,
    ) -> Result<AuthenticatedClient, TokenError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.supports(authentication))
            .ok_or_else(|| {
                TokenError::invalid_client(format!(
                    "no provider for authentication method {}",
                    authentication.method()
                ))
            })?;
        provider.authenticate(authentication).await
    }
}
