use crate::config::SignatureAlgorithm;
use crate::error::TokenError;
use crate::jwt::claims::ClaimsSet;
use crate::keys::provider::KeyMaterialProvider;
use jsonwebtoken::{decode, decode_header, Validation};
use std::sync::Arc;

/// Verifies tokens signed by [`SignedTokenIssuer`](crate::jwt::SignedTokenIssuer)
/// against the provider's public key.
///
/// Checks signature, `kid`, `exp` and `nbf`. Audience is left to the
/// resource server.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyMaterialProvider>,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyMaterialProvider>) -> Self {
        Self { keys }
    }

    /// # Errors
    ///
    /// Returns `Verification` for malformed tokens, unknown key ids,
    /// non-RSA algorithms, bad signatures and expired tokens.
    pub fn verify(&self, token: &str) -> Result<ClaimsSet, TokenError> {
        let header = decode_header(token).map_err(|e| TokenError::verification(e.to_string()))?;
        let algorithm = SignatureAlgorithm::from_jsonwebtoken(header.alg)
            .filter(SignatureAlgorithm::is_rsa)
            .ok_or_else(|| TokenError::verification(format!("Unsupported algorithm {:?}", header.alg)))?;

        let material = self
            .keys
            .get_key_material()
            .map_err(|e| TokenError::verification(format!("Verification key unavailable: {}", e)))?;
        if header.kid.as_deref() != Some(material.key_id()) {
            return Err(TokenError::verification("Unknown key id"));
        }

        let mut validation = Validation::new(algorithm.to_jsonwebtoken());
        validation.validate_aud = false;
        validation.validate_nbf = true;

        decode::<ClaimsSet>(token, material.decoding_key(), &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::verification(e.to_string()))
    }
}
