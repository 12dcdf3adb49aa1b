//! Property-based tests for signed token issuance and verification.

use once_cell::sync::Lazy;
use proptest::prelude::*;
use std::sync::Arc;
use token_issuer::client::{
    AccessTokenFormat, AuthorizationGrantType, ClientAuthenticationMethod, RegisteredClient,
};
use token_issuer::config::SignatureAlgorithm;
use token_issuer::jwt::{names, TokenVerifier};
use token_issuer::keys::{KeyMaterial, KeyMaterialProvider};
use token_issuer::token::{Principal, TokenDispatcher, TokenRequestContext, TokenType};
use token_issuer::TokenError;

static KEYS: Lazy<Arc<KeyMaterialProvider>> = Lazy::new(|| {
    Arc::new(KeyMaterialProvider::with_key_material(
        KeyMaterial::generate().unwrap(),
    ))
});

fn context(token_type: TokenType, id_token_algorithm: SignatureAlgorithm) -> TokenRequestContext {
    let client = RegisteredClient::builder("client-a")
        .authentication_method(ClientAuthenticationMethod::None)
        .grant_type(AuthorizationGrantType::AuthorizationCode)
        .access_token_format(AccessTokenFormat::SelfContained)
        .id_token_signature_algorithm(id_token_algorithm)
        .build()
        .unwrap();
    TokenRequestContext::builder(
        token_type,
        AuthorizationGrantType::AuthorizationCode,
        client,
        Principal::new("user-1", "jane").with_authorities(["USER", "ADMIN"]),
    )
    .authorized_scopes(["openid", "orders:read"])
    .issuer("https://auth.example.com")
    .build()
}

fn arb_rsa_algorithm() -> impl Strategy<Value = SignatureAlgorithm> {
    prop_oneof![
        Just(SignatureAlgorithm::RS256),
        Just(SignatureAlgorithm::RS384),
        Just(SignatureAlgorithm::RS512),
        Just(SignatureAlgorithm::PS256),
        Just(SignatureAlgorithm::PS384),
        Just(SignatureAlgorithm::PS512),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Issued ID tokens verify with the provider's public key under any RSA algorithm.
    #[test]
    fn prop_id_token_round_trip(algorithm in arb_rsa_algorithm()) {
        let dispatcher = TokenDispatcher::new(KEYS.clone());
        let issued = dispatcher.generate(&context(TokenType::Id, algorithm)).unwrap();
        let jwt = issued.as_jwt().unwrap();

        prop_assert_eq!(jwt.header().algorithm, algorithm);
        let claims = TokenVerifier::new(KEYS.clone()).verify(jwt.token_value()).unwrap();
        prop_assert_eq!(&claims, jwt.claims());
    }

    /// Changing any character of the payload invalidates the signature.
    #[test]
    fn prop_tampered_payload_rejected(position in any::<prop::sample::Index>()) {
        let dispatcher = TokenDispatcher::new(KEYS.clone());
        let issued = dispatcher
            .generate(&context(TokenType::Access, SignatureAlgorithm::RS256))
            .unwrap();

        let parts: Vec<&str> = issued.token_value().split('.').collect();
        let mut payload: Vec<u8> = parts[1].bytes().collect();
        let i = position.index(payload.len());
        payload[i] = if payload[i] == b'A' { b'B' } else { b'A' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            String::from_utf8(payload).unwrap(),
            parts[2]
        );

        let result = TokenVerifier::new(KEYS.clone()).verify(&tampered);
        prop_assert!(matches!(result, Err(TokenError::Verification(_))));
    }
}

#[test]
fn test_access_token_carries_authorities_and_kid() {
    let dispatcher = TokenDispatcher::new(KEYS.clone());
    let issued = dispatcher
        .generate(&context(TokenType::Access, SignatureAlgorithm::RS256))
        .unwrap();
    let jwt = issued.as_jwt().unwrap();

    let kid = KEYS.get_key_material().unwrap().key_id().to_string();
    assert_eq!(jwt.header().key_id.as_deref(), Some(kid.as_str()));
    assert_eq!(jwt.claims().get_str(names::AUTHORITIES), Some("USER,ADMIN"));
    assert_eq!(jwt.claims().issuer(), Some("https://auth.example.com"));

    let verified = TokenVerifier::new(KEYS.clone()).verify(jwt.token_value()).unwrap();
    assert_eq!(verified.get_str(names::AUTHORITIES), Some("USER,ADMIN"));
}

#[test]
fn test_es256_id_token_fails_to_sign() {
    let dispatcher = TokenDispatcher::new(KEYS.clone());
    let err = dispatcher
        .generate(&context(TokenType::Id, SignatureAlgorithm::ES256))
        .unwrap_err();
    assert!(matches!(err, TokenError::Signing(_)));
}
