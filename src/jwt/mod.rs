//! JWT assembly, signing and verification.

pub mod assembler;
pub mod claims;
pub mod customizer;
pub mod generator;
pub mod header;
pub mod signer;
pub mod verifier;

pub use assembler::{ClaimsAssembler, UnsignedToken, ID_TOKEN_TTL_MINUTES};
pub use claims::{names, ClaimsBuilder, ClaimsSet};
pub use customizer::{AuthoritiesCustomizer, TokenCustomizer};
pub use generator::JwtGenerator;
pub use header::{JwsHeader, JwsHeaderBuilder};
pub use signer::{SignedJwt, SignedTokenIssuer};
pub use verifier::TokenVerifier;
