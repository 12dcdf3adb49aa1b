//! Token request context and dispatch.

pub mod context;
pub mod dispatcher;
pub mod issued;

pub use context::{
    AuthorizationAttributes, AuthorizationRequest, Principal, SessionInformation,
    TokenRequestContext, TokenRequestContextBuilder, TokenType,
};
pub use dispatcher::TokenDispatcher;
pub use issued::IssuedToken;
