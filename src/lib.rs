//! Token issuer library.
//!
//! Provisions the RSA signing key, authenticates public clients on the
//! refresh grant, and mints signed access/ID tokens and opaque refresh
//! tokens.

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod jwt;
pub mod keys;
pub mod metrics;
pub mod refresh;
pub mod telemetry;
pub mod token;

// Re-exports for convenience
pub use config::{Config, SignatureAlgorithm};
pub use error::TokenError;
pub use keys::{JwksPublisher, KeyMaterial, KeyMaterialProvider};
pub use token::{IssuedToken, TokenDispatcher, TokenRequestContext, TokenType};
