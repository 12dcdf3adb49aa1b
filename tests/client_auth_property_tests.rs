//! Property-based tests for token endpoint client authentication.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use token_issuer::client::{
    AuthorizationGrantType, ClientAssertion, ClientAuthentication, ClientAuthenticationChain,
    ClientAuthenticationMethod, ClientAuthenticator, InMemoryClientRegistry, RegisteredClient,
};
use token_issuer::TokenError;
use zeroize::Zeroizing;

fn public_client(client_id: &str) -> RegisteredClient {
    RegisteredClient::builder(client_id)
        .authentication_method(ClientAuthenticationMethod::None)
        .grant_type(AuthorizationGrantType::RefreshToken)
        .build()
        .unwrap()
}

fn confidential_client(client_id: &str, secret: &str) -> RegisteredClient {
    RegisteredClient::builder(client_id)
        .client_secret(secret)
        .authentication_method(ClientAuthenticationMethod::ClientSecretBasic)
        .grant_type(AuthorizationGrantType::AuthorizationCode)
        .grant_type(AuthorizationGrantType::RefreshToken)
        .build()
        .unwrap()
}

fn arb_client_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{2,30}"
}

fn arb_non_none_method() -> impl Strategy<Value = ClientAuthenticationMethod> {
    prop_oneof![
        Just(ClientAuthenticationMethod::ClientSecretBasic),
        Just(ClientAuthenticationMethod::ClientSecretPost),
        Just(ClientAuthenticationMethod::PrivateKeyJwt),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// A registered public client authenticates with a `none` assertion.
    #[test]
    fn prop_public_client_authenticates(client_id in arb_client_id()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let registry = Arc::new(InMemoryClientRegistry::new([public_client(&client_id)]));
            let authenticator = ClientAuthenticator::new(registry);

            let assertion = ClientAssertion::new(client_id.clone(), ClientAuthenticationMethod::None);
            let authenticated = authenticator.authenticate_assertion(&assertion).await.unwrap();

            prop_assert_eq!(authenticated.registered_client().client_id(), client_id.as_str());
            prop_assert_eq!(authenticated.authentication_method(), ClientAuthenticationMethod::None);
            Ok(())
        })?;
    }

    /// Any declared method other than `none` is rejected, even for a known client.
    #[test]
    fn prop_other_methods_rejected(client_id in arb_client_id(), method in arb_non_none_method()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let registry = Arc::new(InMemoryClientRegistry::new([public_client(&client_id)]));
            let authenticator = ClientAuthenticator::new(registry);

            let result = authenticator
                .authenticate_assertion(&ClientAssertion::new(client_id.clone(), method))
                .await;

            prop_assert!(matches!(result, Err(TokenError::InvalidClient(_))));
            Ok(())
        })?;
    }

    /// Unknown client ids never authenticate.
    #[test]
    fn prop_unknown_client_rejected(registered in arb_client_id(), presented in arb_client_id()) {
        prop_assume!(registered != presented);
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let registry = Arc::new(InMemoryClientRegistry::new([public_client(&registered)]));
            let authenticator = ClientAuthenticator::new(registry);

            let result = authenticator
                .authenticate_assertion(&ClientAssertion::new(presented.clone(), ClientAuthenticationMethod::None))
                .await;

            prop_assert!(matches!(result, Err(TokenError::InvalidClient(_))));
            Ok(())
        })?;
    }

    /// Only the registered secret authenticates a confidential client.
    #[test]
    fn prop_secret_must_match(
        client_id in arb_client_id(),
        secret in "[A-Za-z0-9]{16,40}",
        presented in "[A-Za-z0-9]{16,40}",
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let registry = Arc::new(InMemoryClientRegistry::new([confidential_client(&client_id, &secret)]));
            let chain = ClientAuthenticationChain::standard(registry);

            let authentication = ClientAuthentication::ClientSecret {
                client_id: client_id.clone(),
                client_secret: Zeroizing::new(presented.clone()),
                method: ClientAuthenticationMethod::ClientSecretBasic,
            };
            let result = chain.authenticate(&authentication).await;

            prop_assert_eq!(result.is_ok(), presented == secret);
            Ok(())
        })?;
    }
}

#[test]
fn test_form_parameters_to_assertion() {
    let params: HashMap<String, String> = [
        ("grant_type", "refresh_token"),
        ("client_id", "mobile-app"),
        ("refresh_token", "opaque"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let assertion = ClientAssertion::from_token_request(&params).unwrap();
    assert_eq!(assertion.client_id(), "mobile-app");
    assert_eq!(assertion.authentication_method(), ClientAuthenticationMethod::None);
}

#[tokio::test]
async fn test_chain_authenticates_public_client() {
    let registry = Arc::new(InMemoryClientRegistry::new([public_client("mobile-app")]));
    let chain = ClientAuthenticationChain::standard(registry);

    let authentication = ClientAuthentication::PublicClient(ClientAssertion::new(
        "mobile-app",
        ClientAuthenticationMethod::None,
    ));
    let authenticated = chain.authenticate(&authentication).await.unwrap();
    assert_eq!(authenticated.registered_client().client_id(), "mobile-app");
}
