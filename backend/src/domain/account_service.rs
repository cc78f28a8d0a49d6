//! Account service: registration, password login and bearer authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccountCommand, IdentityProvider, IdentityProviderError, IdentityVerifier,
    IdentityVerifierError, LoginRequest, LoginResponse, RegisterRequest, SignUpRequest,
    UserRepository, UserRepositoryError,
};
use crate::domain::{Email, Error, User, VerifiedIdentity};

const UNAUTHORIZED_MESSAGE: &str = "invalid or expired credentials";

fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Rejected { message } => Error::invalid_request(message),
        IdentityProviderError::Unavailable { message } => {
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
        IdentityProviderError::InvalidResponse { message } => {
            Error::internal(format!("identity provider response invalid: {message}"))
        }
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_verification_error(error: IdentityVerifierError) -> Error {
    match error {
        IdentityVerifierError::KeySetUnavailable { message } => {
            warn!(%message, "token verification failed: signing keys unavailable");
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
        other => {
            debug!(error = %other, "token verification failed");
            Error::unauthorized(UNAUTHORIZED_MESSAGE)
        }
    }
}

/// Account service over the identity provider, token verifier and users.
#[derive(Clone)]
pub struct AccountService<P, V, U> {
    provider: Arc<P>,
    verifier: Arc<V>,
    users: Arc<U>,
}

impl<P, V, U> AccountService<P, V, U> {
    /// Create the service from its driven ports.
    pub fn new(provider: Arc<P>, verifier: Arc<V>, users: Arc<U>) -> Self {
        Self {
            provider,
            verifier,
            users,
        }
    }
}

impl<P, V, U> AccountService<P, V, U>
where
    V: IdentityVerifier,
    U: UserRepository,
{
    async fn verify_and_record(&self, token: &str) -> Result<VerifiedIdentity, Error> {
        let identity = self
            .verifier
            .verify(token)
            .await
            .map_err(map_verification_error)?;

        let created = self
            .users
            .ensure(&User::from(identity.clone()))
            .await
            .map_err(map_user_error)?;
        if created {
            info!(user_id = %identity.user_id, "recorded first authentication");
        }
        Ok(identity)
    }
}

#[async_trait]
impl<P, V, U> AccountCommand for AccountService<P, V, U>
where
    P: IdentityProvider,
    V: IdentityVerifier,
    U: UserRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<(), Error> {
        let RegisterRequest {
            username,
            email,
            password,
        } = request;
        if username.trim().is_empty() {
            return Err(Error::invalid_request("username must not be empty"));
        }
        if password.is_empty() {
            return Err(Error::invalid_request("password must not be empty"));
        }
        let email = Email::new(email).map_err(|err| Error::invalid_request(err.to_string()))?;

        self.provider
            .sign_up(&SignUpRequest {
                username: username.clone(),
                email,
                password,
            })
            .await
            .map_err(map_provider_error)?;
        info!(%username, "account registered");
        Ok(())
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, Error> {
        let tokens = self
            .provider
            .login(&request.username, &request.password)
            .await
            .map_err(|err| match err {
                IdentityProviderError::Rejected { message } => {
                    debug!(%message, "login rejected");
                    Error::unauthorized("incorrect username or password")
                }
                other => map_provider_error(other),
            })?;

        let identity = self.verify_and_record(&tokens.id_token).await?;
        Ok(LoginResponse { tokens, identity })
    }

    async fn authenticate_token(&self, token: &str) -> Result<VerifiedIdentity, Error> {
        self.verify_and_record(token).await
    }
}
