//! Port for account registration and password login against the external
//! identity provider.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::Email;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider refused the request (bad credentials, taken username,
        /// weak password).
        Rejected { message: String } => "identity provider rejected request: {message}",
        /// The provider could not be reached or timed out.
        Unavailable { message: String } => "identity provider unavailable: {message}",
        /// The provider answered with a payload we could not interpret.
        InvalidResponse { message: String } => "identity provider response invalid: {message}",
    }
}

/// New account details forwarded to the provider.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub username: String,
    pub email: Email,
    pub password: Zeroizing<String>,
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: String,
}

/// Delegates account management to the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), IdentityProviderError>;

    /// Exchange a username and password for tokens.
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityProviderError>;
}

/// Fixture provider that accepts any sign up and issues tokens whose text
/// [`super::FixtureIdentityVerifier`] understands.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn sign_up(&self, _request: &SignUpRequest) -> Result<(), IdentityProviderError> {
        Ok(())
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityProviderError> {
        if password.is_empty() {
            return Err(IdentityProviderError::rejected("incorrect username or password"));
        }
        Ok(AuthTokens {
            access_token: username.to_owned(),
            id_token: username.to_owned(),
        })
    }
}
