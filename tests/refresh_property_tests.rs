//! Property-based tests for opaque refresh token issuance.

use chrono::{DateTime, Duration};
use proptest::prelude::*;
use token_issuer::client::{AuthorizationGrantType, ClientAuthenticationMethod, RegisteredClient};
use token_issuer::refresh::RefreshTokenIssuer;
use token_issuer::token::{Principal, TokenRequestContext, TokenType};

fn context(client_id: &str, ttl: Duration) -> TokenRequestContext {
    let client = RegisteredClient::builder(client_id)
        .authentication_method(ClientAuthenticationMethod::None)
        .grant_type(AuthorizationGrantType::RefreshToken)
        .access_token_ttl(ttl)
        .build()
        .unwrap();
    TokenRequestContext::builder(
        TokenType::Refresh,
        AuthorizationGrantType::RefreshToken,
        client,
        Principal::new("user-1", "jane"),
    )
    .build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Refresh token lifetime equals the client's access token TTL exactly.
    #[test]
    fn prop_lifetime_matches_access_token_ttl(
        ttl_secs in 1i64..315_360_000,
        issued in 1_000_000_000i64..2_000_000_000,
    ) {
        let ttl = Duration::seconds(ttl_secs);
        let t0 = DateTime::from_timestamp(issued, 0).unwrap();

        let token = RefreshTokenIssuer::new()
            .issue_at(&context("client-a", ttl), t0)
            .unwrap()
            .unwrap();

        prop_assert_eq!(token.issued_at(), t0);
        prop_assert_eq!(token.expires_at() - token.issued_at(), ttl);
    }

    /// Values are 43 URL-safe characters without padding.
    #[test]
    fn prop_value_is_url_safe(_seed in any::<u8>()) {
        let token = RefreshTokenIssuer::new()
            .issue(&context("client-a", Duration::minutes(5)))
            .unwrap()
            .unwrap();

        prop_assert_eq!(token.token_value().len(), 43);
        prop_assert!(!token.token_value().contains('='));
        prop_assert!(token
            .token_value()
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }
}

#[test]
fn test_ninety_day_client() {
    let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let token = RefreshTokenIssuer::new()
        .issue_at(&context("clientA", Duration::days(90)), t0)
        .unwrap()
        .unwrap();
    assert_eq!(token.expires_at(), t0 + Duration::days(90));
}
