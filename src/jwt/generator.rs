use crate::error::TokenError;
use crate::jwt::assembler::ClaimsAssembler;
use crate::jwt::customizer::TokenCustomizer;
use crate::jwt::signer::{SignedJwt, SignedTokenIssuer};
use crate::keys::provider::KeyMaterialProvider;
use crate::metrics;
use crate::token::context::TokenRequestContext;
use std::sync::Arc;
use tracing::info;

/// Assembles and signs access and ID tokens.
#[derive(Clone)]
pub struct JwtGenerator {
    assembler: ClaimsAssembler,
    signer: SignedTokenIssuer,
}

impl JwtGenerator {
    pub fn new(keys: Arc<KeyMaterialProvider>) -> Self {
        Self {
            assembler: ClaimsAssembler::new(),
            signer: SignedTokenIssuer::new(keys),
        }
    }

    #[must_use]
    pub fn with_customizer(mut self, customizer: Arc<dyn TokenCustomizer>) -> Self {
        self.assembler = self.assembler.with_customizer(customizer);
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.assembler = self.assembler.with_issuer(issuer);
        self
    }

    pub fn issuer(&self) -> Option<&str> {
        self.assembler.issuer()
    }

    /// `Ok(None)` when the context asks for a token this generator does not
    /// produce.
    ///
    /// # Errors
    ///
    /// Propagates assembly and signing failures.
    pub fn generate(&self, context: &TokenRequestContext) -> Result<Option<SignedJwt>, TokenError> {
        let Some(unsigned) = self.assembler.assemble(context)? else {
            return Ok(None);
        };

        let jwt = self.signer.sign(unsigned.header, unsigned.claims)?;
        metrics::record_token_issued(context.token_type().as_str(), jwt.header().algorithm.as_str());
        info!(
            token_type = %context.token_type(),
            client_id = %context.registered_client().client_id(),
            jti = jwt.claims().id().unwrap_or_default(),
            "Issued JWT"
        );
        Ok(Some(jwt))
    }
}
