//! JWK Thumbprint calculation per RFC 7638.
//!
//! The thumbprint doubles as the signing key's `kid`, so the identifier
//! depends only on the public key and survives restarts.

use crate::keys::jwks::Jwk;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Calculates the JWK thumbprint per RFC 7638.
pub struct JwkThumbprint;

impl JwkThumbprint {
    /// Computes the SHA-256 thumbprint of a JWK.
    #[must_use]
    pub fn compute(jwk: &Jwk) -> String {
        Self::compute_rsa(&jwk.n, &jwk.e)
    }

    /// Computes the thumbprint of an RSA public key from its base64url
    /// encoded modulus and exponent.
    #[must_use]
    pub fn compute_rsa(n: &str, e: &str) -> String {
        let canonical = Self::canonical_rsa_json(n, e);
        let hash = Sha256::digest(canonical.as_bytes());
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, hash)
    }

    /// Required RSA members in lexicographic order, no whitespace.
    fn canonical_rsa_json(n: &str, e: &str) -> String {
        format!(r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#, e, n)
    }

    /// Verifies that a thumbprint matches a JWK using constant-time comparison.
    #[must_use]
    pub fn verify(jwk: &Jwk, expected_thumbprint: &str) -> bool {
        let computed = Self::compute(jwk);
        let computed_bytes = computed.as_bytes();
        let expected_bytes = expected_thumbprint.as_bytes();

        if computed_bytes.len() != expected_bytes.len() {
            return false;
        }

        computed_bytes.ct_eq(expected_bytes).into()
    }
}
