pub mod jwks;
pub mod material;
pub mod provider;
pub mod thumbprint;

pub use jwks::{Jwk, Jwks, JwksPublisher};
pub use material::{KeyMaterial, RSA_KEY_BITS};
pub use provider::KeyMaterialProvider;
pub use thumbprint::JwkThumbprint;
