//! JSON Web Key Set publication for the current signing key.

use crate::config::SignatureAlgorithm;
use crate::error::TokenError;
use crate::keys::provider::KeyMaterialProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// RSA public key in JWK form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub alg: String,
    pub n: String,
    pub e: String,
}

/// A JWK set document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl Jwks {
    pub fn new() -> Self {
        Jwks { keys: Vec::new() }
    }

    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    pub fn to_json(&self) -> Result<String, TokenError> {
        serde_json::to_string(self)
            .map_err(|e| TokenError::key_provisioning(format!("JWKS serialization failed: {}", e)))
    }
}

/// Publishes the provider's key as the verification key set.
pub struct JwksPublisher {
    keys: Arc<KeyMaterialProvider>,
    algorithm: SignatureAlgorithm,
}

impl JwksPublisher {
    pub fn new(keys: Arc<KeyMaterialProvider>) -> Self {
        JwksPublisher {
            keys,
            algorithm: SignatureAlgorithm::RS256,
        }
    }

    /// Advertise a different `alg` on the published key.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Current key set.
    ///
    /// # Errors
    ///
    /// Fails when the key material cannot be provisioned.
    pub fn get_jwks(&self) -> Result<Jwks, TokenError> {
        let material = self.keys.get_key_material()?;
        let mut jwks = Jwks::new();
        jwks.add_key(material.to_jwk(self.algorithm));
        Ok(jwks)
    }

    /// Key id the published set leads with.
    ///
    /// # Errors
    ///
    /// Fails when the key material cannot be provisioned.
    pub fn get_current_key_id(&self) -> Result<String, TokenError> {
        Ok(self.keys.get_key_material()?.key_id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwk(kid: &str) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: kid.to_string(),
            key_use: "sig".to_string(),
            alg: "RS256".to_string(),
            n: "test-n".to_string(),
            e: "AQAB".to_string(),
        }
    }

    #[test]
    fn test_jwks_find() {
        let mut jwks = Jwks::new();
        jwks.add_key(jwk("key-1"));
        jwks.add_key(jwk("key-2"));

        assert_eq!(jwks.find("key-2").map(|k| k.kid.as_str()), Some("key-2"));
        assert!(jwks.find("key-3").is_none());
    }

    #[test]
    fn test_jwk_serializes_use_member() {
        let mut jwks = Jwks::new();
        jwks.add_key(jwk("key-1"));

        let json: serde_json::Value = serde_json::from_str(&jwks.to_json().unwrap()).unwrap();
        assert_eq!(json["keys"][0]["use"], "sig");
        assert_eq!(json["keys"][0]["kty"], "RSA");
        assert!(json["keys"][0].get("key_use").is_none());
    }
}
