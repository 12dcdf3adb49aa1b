//! RSA signing key material.

use crate::config::SignatureAlgorithm;
use crate::error::TokenError;
use crate::keys::jwks::Jwk;
use crate::keys::thumbprint::JwkThumbprint;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::Zeroizing;

/// RSA modulus size for generated keys.
pub const RSA_KEY_BITS: usize = 2048;

/// An RSA key pair with its key id and prepared `jsonwebtoken` keys.
///
/// Immutable once built. `Debug` never prints key bytes.
pub struct KeyMaterial {
    key_id: String,
    public_key: RsaPublicKey,
    private_key: RsaPrivateKey,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl KeyMaterial {
    /// Generate a fresh 2048-bit key pair.
    ///
    /// # Errors
    ///
    /// Returns `KeyProvisioning` if generation fails.
    pub fn generate() -> Result<Self, TokenError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| TokenError::key_provisioning(format!("RSA key generation failed: {}", e)))?;
        let public_key = private_key.to_public_key();
        Self::from_key_pair(private_key, public_key)
    }

    /// Decode a PKCS#8 DER private key and an X.509 SubjectPublicKeyInfo
    /// DER public key.
    ///
    /// # Errors
    ///
    /// Returns `KeyProvisioning` if either half fails to decode or the
    /// halves do not belong together.
    pub fn from_der(private_der: &[u8], public_der: &[u8]) -> Result<Self, TokenError> {
        let private_key = RsaPrivateKey::from_pkcs8_der(private_der)
            .map_err(|e| TokenError::key_provisioning(format!("Invalid PKCS#8 private key: {}", e)))?;
        let public_key = RsaPublicKey::from_public_key_der(public_der)
            .map_err(|e| TokenError::key_provisioning(format!("Invalid X.509 public key: {}", e)))?;
        Self::from_key_pair(private_key, public_key)
    }

    /// Build material from an existing key pair.
    ///
    /// # Errors
    ///
    /// Returns `KeyProvisioning` if the public key does not match the
    /// private key, the modulus is shorter than [`RSA_KEY_BITS`], or the
    /// signing keys cannot be prepared.
    pub fn from_key_pair(
        private_key: RsaPrivateKey,
        public_key: RsaPublicKey,
    ) -> Result<Self, TokenError> {
        if private_key.to_public_key() != public_key {
            return Err(TokenError::key_provisioning(
                "Public key does not match private key",
            ));
        }
        let bits = public_key.size() * 8;
        if bits < RSA_KEY_BITS {
            return Err(TokenError::key_provisioning(format!(
                "RSA key is {} bits, at least {} required",
                bits, RSA_KEY_BITS
            )));
        }

        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());
        let key_id = JwkThumbprint::compute_rsa(&n, &e);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| TokenError::key_provisioning(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| TokenError::key_provisioning(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| TokenError::key_provisioning(e.to_string()))?;

        Ok(Self {
            key_id,
            public_key,
            private_key,
            encoding_key,
            decoding_key,
        })
    }

    /// Stable key identifier (RFC 7638 thumbprint of the public key).
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Key family. Always RSA.
    #[must_use]
    pub const fn algorithm(&self) -> &'static str {
        "RSA"
    }

    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn key_size(&self) -> usize {
        self.public_key.size() * 8
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// PKCS#8 DER encoding of the private key.
    ///
    /// # Errors
    ///
    /// Returns `KeyProvisioning` if encoding fails.
    pub fn private_key_der(&self) -> Result<Zeroizing<Vec<u8>>, TokenError> {
        let document = self
            .private_key
            .to_pkcs8_der()
            .map_err(|e| TokenError::key_provisioning(e.to_string()))?;
        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    /// X.509 SubjectPublicKeyInfo DER encoding of the public key.
    ///
    /// # Errors
    ///
    /// Returns `KeyProvisioning` if encoding fails.
    pub fn public_key_der(&self) -> Result<Vec<u8>, TokenError> {
        let document = self
            .public_key
            .to_public_key_der()
            .map_err(|e| TokenError::key_provisioning(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Public half as a JWK advertising `algorithm`.
    #[must_use]
    pub fn to_jwk(&self, algorithm: SignatureAlgorithm) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: self.key_id.clone(),
            key_use: "sig".to_string(),
            alg: algorithm.as_str().to_string(),
            n: URL_SAFE_NO_PAD.encode(self.public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(self.public_key.e().to_bytes_be()),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm())
            .field("key_size", &self.key_size())
            .finish_non_exhaustive()
    }
}
