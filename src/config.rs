//! Centralized configuration for the token issuer.
//!
//! All configuration is loaded from environment variables and validated
//! at startup.

use crate::error::TokenError;
use crate::telemetry::TracingConfig;
use jsonwebtoken::Algorithm;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// JWS signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    RS512,
    /// RSASSA-PSS with SHA-256
    PS256,
    /// RSASSA-PSS with SHA-384
    PS384,
    /// RSASSA-PSS with SHA-512
    PS512,
    /// ECDSA with P-256 and SHA-256
    ES256,
}

impl SignatureAlgorithm {
    /// Get algorithm name for JWT header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
        }
    }

    /// Whether the algorithm signs with an RSA key.
    #[must_use]
    pub const fn is_rsa(&self) -> bool {
        !matches!(self, Self::ES256)
    }

    /// The matching `jsonwebtoken` algorithm.
    #[must_use]
    pub const fn to_jsonwebtoken(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
            Self::PS256 => Algorithm::PS256,
            Self::PS384 => Algorithm::PS384,
            Self::PS512 => Algorithm::PS512,
            Self::ES256 => Algorithm::ES256,
        }
    }

    /// Map a `jsonwebtoken` algorithm back, if it is one we issue.
    #[must_use]
    pub const fn from_jsonwebtoken(alg: Algorithm) -> Option<Self> {
        match alg {
            Algorithm::RS256 => Some(Self::RS256),
            Algorithm::RS384 => Some(Self::RS384),
            Algorithm::RS512 => Some(Self::RS512),
            Algorithm::PS256 => Some(Self::PS256),
            Algorithm::PS384 => Some(Self::PS384),
            Algorithm::PS512 => Some(Self::PS512),
            Algorithm::ES256 => Some(Self::ES256),
            _ => None,
        }
    }
}

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        Self::RS256
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "PS256" => Ok(Self::PS256),
            "PS384" => Ok(Self::PS384),
            "PS512" => Ok(Self::PS512),
            "ES256" => Ok(Self::ES256),
            _ => Err(TokenError::config(format!("Invalid JWT algorithm: {}", s))),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment environment. Production never generates signing keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Production deployment
    Production,
    /// Any other environment, carrying its profile name
    Development(String),
}

impl RuntimeMode {
    /// Classify a profile name. `prod` and `production` are production,
    /// regardless of case.
    #[must_use]
    pub fn from_profile(profile: &str) -> Self {
        let trimmed = profile.trim();
        if trimmed.eq_ignore_ascii_case("prod") || trimmed.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development(trimmed.to_string())
        }
    }

    /// Whether this is a production deployment.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development(profile) => f.write_str(profile),
        }
    }
}

/// Location of the persisted RSA key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStoreConfig {
    /// Directory holding both key files
    pub directory: PathBuf,
    /// File name of the PKCS#8 DER private key
    pub private_key_file: String,
    /// File name of the X.509 SubjectPublicKeyInfo DER public key
    pub public_key_file: String,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("keys"),
            private_key_file: "private.key".to_string(),
            public_key_file: "public.key".to_string(),
        }
    }
}

impl KeyStoreConfig {
    /// Key store rooted at `directory` with default file names.
    #[must_use]
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Full path of the private key file.
    #[must_use]
    pub fn private_key_path(&self) -> PathBuf {
        self.directory.join(&self.private_key_file)
    }

    /// Full path of the public key file.
    #[must_use]
    pub fn public_key_path(&self) -> PathBuf {
        self.directory.join(&self.public_key_file)
    }
}

/// Token issuer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime mode, gates key generation
    pub runtime_mode: RuntimeMode,
    /// Signing key location
    pub key_store: KeyStoreConfig,
    /// Default `iss` claim, used when a request carries none
    pub issuer: Option<String>,
    /// Logging setup
    pub tracing: TracingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, TokenError> {
        dotenvy::dotenv().ok();

        let runtime_mode =
            RuntimeMode::from_profile(&env::var("RUNTIME_MODE").unwrap_or_else(|_| "dev".to_string()));

        let key_store = KeyStoreConfig {
            directory: PathBuf::from(env::var("KEYS_DIR").unwrap_or_else(|_| "keys".to_string())),
            private_key_file: env::var("KEYS_PRIVATE").unwrap_or_else(|_| "private.key".to_string()),
            public_key_file: env::var("KEYS_PUBLIC").unwrap_or_else(|_| "public.key".to_string()),
        };
        if key_store.private_key_file == key_store.public_key_file {
            return Err(TokenError::config(
                "KEYS_PRIVATE and KEYS_PUBLIC must name different files",
            ));
        }

        let issuer = env::var("JWT_ISSUER").ok().filter(|s| !s.trim().is_empty());

        let mut tracing = TracingConfig::default()
            .with_service_name("token-issuer")
            .with_log_level(env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));
        if parse_env("LOG_JSON", false)? {
            tracing = tracing.with_json_output();
        }

        Ok(Self {
            runtime_mode,
            key_store,
            issuer,
            tracing,
        })
    }
}

/// Parse environment variable with default value.
fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, TokenError>
where
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| TokenError::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_algorithm_parsing() {
        assert_eq!("RS256".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::RS256);
        assert_eq!("rs384".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::RS384);
        assert_eq!("PS512".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::PS512);
        assert_eq!("ES256".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::ES256);
        assert!("HS256".parse::<SignatureAlgorithm>().is_err());
    }

    #[test]
    fn test_signature_algorithm_family() {
        assert!(SignatureAlgorithm::RS256.is_rsa());
        assert!(SignatureAlgorithm::PS256.is_rsa());
        assert!(!SignatureAlgorithm::ES256.is_rsa());
        assert_eq!(SignatureAlgorithm::default(), SignatureAlgorithm::RS256);
    }

    #[test]
    fn test_jsonwebtoken_mapping() {
        for alg in [
            SignatureAlgorithm::RS256,
            SignatureAlgorithm::RS512,
            SignatureAlgorithm::PS384,
            SignatureAlgorithm::ES256,
        ] {
            assert_eq!(SignatureAlgorithm::from_jsonwebtoken(alg.to_jsonwebtoken()), Some(alg));
        }
        assert_eq!(SignatureAlgorithm::from_jsonwebtoken(Algorithm::HS256), None);
    }

    #[test]
    fn test_runtime_mode() {
        assert!(RuntimeMode::from_profile("prod").is_production());
        assert!(RuntimeMode::from_profile("PROD").is_production());
        assert!(RuntimeMode::from_profile("Production").is_production());
        assert!(!RuntimeMode::from_profile("dev").is_production());
        assert!(!RuntimeMode::from_profile("staging").is_production());
        assert_eq!(RuntimeMode::from_profile("test").to_string(), "test");
    }

    #[test]
    fn test_key_store_paths() {
        let store = KeyStoreConfig::in_directory("/var/lib/keys");
        assert_eq!(store.private_key_path(), PathBuf::from("/var/lib/keys/private.key"));
        assert_eq!(store.public_key_path(), PathBuf::from("/var/lib/keys/public.key"));
    }
}
