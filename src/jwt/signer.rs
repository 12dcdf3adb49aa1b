//! JWS signing with the provider's RSA key.

use crate::error::TokenError;
use crate::jwt::claims::ClaimsSet;
use crate::jwt::header::JwsHeader;
use crate::keys::provider::KeyMaterialProvider;
use jsonwebtoken::encode;
use std::sync::Arc;
use tracing::debug;

/// A compact-serialized signed JWT with the header and claims it carries.
#[derive(Debug, Clone)]
pub struct SignedJwt {
    token: String,
    header: JwsHeader,
    claims: ClaimsSet,
}

impl SignedJwt {
    /// Compact serialization `header.payload.signature`.
    pub fn token_value(&self) -> &str {
        &self.token
    }

    pub fn header(&self) -> &JwsHeader {
        &self.header
    }

    pub fn claims(&self) -> &ClaimsSet {
        &self.claims
    }

    /// Base64url signature segment.
    pub fn signature(&self) -> &str {
        self.token.rsplit('.').next().unwrap_or_default()
    }

    pub fn into_token_value(self) -> String {
        self.token
    }
}

/// Signs claim sets with the current key, stamping its `kid` in the header.
#[derive(Clone)]
pub struct SignedTokenIssuer {
    keys: Arc<KeyMaterialProvider>,
}

impl SignedTokenIssuer {
    pub fn new(keys: Arc<KeyMaterialProvider>) -> Self {
        Self { keys }
    }

    /// Sign `claims` under `header`.
    ///
    /// The header's `kid` is replaced with the signing key's id.
    ///
    /// # Errors
    ///
    /// Returns `Signing` if the key is unavailable, the algorithm is not an
    /// RSA algorithm, or encoding fails.
    pub fn sign(&self, mut header: JwsHeader, claims: ClaimsSet) -> Result<SignedJwt, TokenError> {
        if !header.algorithm.is_rsa() {
            return Err(TokenError::signing(format!(
                "{} cannot be used with an RSA signing key",
                header.algorithm
            )));
        }

        let material = self
            .keys
            .get_key_material()
            .map_err(|e| TokenError::signing(format!("Signing key unavailable: {}", e)))?;
        header.key_id = Some(material.key_id().to_string());

        let token = encode(&header.to_jsonwebtoken(), &claims, material.encoding_key())?;
        debug!(kid = %material.key_id(), alg = %header.algorithm, "Signed JWT");

        Ok(SignedJwt {
            token,
            header,
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeyStoreConfig, RuntimeMode, SignatureAlgorithm};
    use crate::jwt::claims::ClaimsBuilder;
    use crate::keys::material::KeyMaterial;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use once_cell::sync::Lazy;

    static KEYS: Lazy<Arc<KeyMaterialProvider>> = Lazy::new(|| {
        Arc::new(KeyMaterialProvider::with_key_material(
            KeyMaterial::generate().unwrap(),
        ))
    });

    fn claims() -> ClaimsSet {
        let mut builder = ClaimsBuilder::new();
        builder.subject("user-1").claim("scope", vec!["openid"]);
        builder.build()
    }

    #[test]
    fn test_sign_sets_kid_and_header() {
        let issuer = SignedTokenIssuer::new(KEYS.clone());
        let mut header = JwsHeader::with(SignatureAlgorithm::RS256);
        header.key_id("caller-supplied");

        let jwt = issuer.sign(header.build(), claims()).unwrap();
        let kid = KEYS.get_key_material().unwrap().key_id().to_string();
        assert_eq!(jwt.header().key_id.as_deref(), Some(kid.as_str()));

        let decoded = jsonwebtoken::decode_header(jwt.token_value()).unwrap();
        assert_eq!(decoded.kid.as_deref(), Some(kid.as_str()));
        assert_eq!(decoded.alg, jsonwebtoken::Algorithm::RS256);
        assert_eq!(decoded.typ.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_payload_is_claim_set() {
        let issuer = SignedTokenIssuer::new(KEYS.clone());
        let jwt = issuer
            .sign(JwsHeader::with(SignatureAlgorithm::RS256).build(), claims())
            .unwrap();

        let payload = jwt.token_value().split('.').nth(1).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(payload).unwrap();
        let decoded: ClaimsSet = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(&decoded, jwt.claims());
        assert_eq!(jwt.signature().len(), 342);
    }

    #[test]
    fn test_non_rsa_algorithm_rejected() {
        let issuer = SignedTokenIssuer::new(KEYS.clone());
        let err = issuer
            .sign(JwsHeader::with(SignatureAlgorithm::ES256).build(), claims())
            .unwrap_err();
        assert!(matches!(err, TokenError::Signing(_)));
    }

    #[test]
    fn test_unavailable_key_is_signing_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = KeyMaterialProvider::new(
            KeyStoreConfig::in_directory(dir.path()),
            RuntimeMode::Production,
        );
        let issuer = SignedTokenIssuer::new(Arc::new(provider));

        let err = issuer
            .sign(JwsHeader::with(SignatureAlgorithm::RS256).build(), claims())
            .unwrap_err();
        assert!(matches!(err, TokenError::Signing(_)));
    }
}
