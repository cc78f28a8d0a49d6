//! Identity adapters: bearer token verification and password flows against
//! the managed identity provider.

mod cognito;
mod jwks;

pub use cognito::CognitoIdentityProvider;
pub use jwks::{
    HttpKeySetSource, JwtIdentityVerifier, KeySetSource, StaticKeySetSource, TokenExpectations,
};
