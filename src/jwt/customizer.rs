//! Claim customization hook.
//!
//! Runs after the standard claims are assembled and before they are frozen.
//! Customizers see every JWT the assembler builds and decide by
//! [`TokenType`] what to touch.

use crate::jwt::claims::{names, ClaimsBuilder};
use crate::jwt::header::JwsHeaderBuilder;
use crate::token::context::{TokenRequestContext, TokenType};

/// Injects or rewrites claims and header fields.
pub trait TokenCustomizer: Send + Sync {
    fn customize(
        &self,
        context: &TokenRequestContext,
        claims: &mut ClaimsBuilder,
        header: &mut JwsHeaderBuilder,
    );
}

impl<F> TokenCustomizer for F
where
    F: Fn(&TokenRequestContext, &mut ClaimsBuilder, &mut JwsHeaderBuilder) + Send + Sync,
{
    fn customize(
        &self,
        context: &TokenRequestContext,
        claims: &mut ClaimsBuilder,
        header: &mut JwsHeaderBuilder,
    ) {
        self(context, claims, header);
    }
}

/// Adds the principal's granted authorities to access tokens as a
/// comma-joined `authorities` claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthoritiesCustomizer;

impl TokenCustomizer for AuthoritiesCustomizer {
    fn customize(
        &self,
        context: &TokenRequestContext,
        claims: &mut ClaimsBuilder,
        _header: &mut JwsHeaderBuilder,
    ) {
        if context.token_type() == TokenType::Access {
            claims.claim(names::AUTHORITIES, context.principal().authorities().join(","));
        }
    }
}
