//! Driving port for registration, password login and bearer authentication.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Error, VerifiedIdentity};

use super::AuthTokens;

/// Account registration input as received from a client.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: Zeroizing<String>,
}

/// Password login input.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: Zeroizing<String>,
}

/// Successful login: provider tokens plus the identity they assert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub tokens: AuthTokens,
    pub identity: VerifiedIdentity,
}

/// Driving port for account flows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account with the identity provider.
    async fn register(&self, request: RegisterRequest) -> Result<(), Error>;

    /// Exchange credentials for tokens and record the user.
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, Error>;

    /// Verify a bearer token and ensure the user record exists.
    ///
    /// Every verification failure is reported as `unauthorized`.
    async fn authenticate_token(&self, token: &str) -> Result<VerifiedIdentity, Error>;
}
