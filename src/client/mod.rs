pub mod authenticator;
pub mod registry;

pub use authenticator::{
    AuthenticatedClient, ClientAssertion, ClientAuthentication, ClientAuthenticationChain,
    ClientAuthenticationProvider, ClientAuthenticator, ClientSecretAuthenticator,
};
pub use registry::{
    AccessTokenFormat, AuthorizationGrantType, ClientAuthenticationMethod, ClientRegistry,
    InMemoryClientRegistry, RegisteredClient, RegisteredClientBuilder, TokenSettings,
};
