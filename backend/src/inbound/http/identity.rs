//! Caller identity resolution for protected endpoints.
//!
//! Order: (1) identity stored in the cookie session, (2) `Authorization:
//! Bearer` token verified through [`AccountCommand::authenticate_token`].
//! A request carrying neither is rejected with `401`.
//!
//! [`AccountCommand::authenticate_token`]: crate::domain::ports::AccountCommand::authenticate_token

use actix_session::SessionExt;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Error, UserId, VerifiedIdentity};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, resolved from the session cookie or a bearer
/// token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub VerifiedIdentity);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0.user_id
    }

    pub fn into_identity(self) -> VerifiedIdentity {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    let token = raw
        .strip_prefix(BEARER_PREFIX)
        .or_else(|| raw.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must carry a bearer token"))?;
    Ok(Some(token.to_owned()))
}

/// Resolve the caller identity.
///
/// # Errors
/// Returns `unauthorized` when no identity source is present or the bearer
/// token fails verification. A malformed `Authorization` header only counts
/// when the session carries no identity.
pub async fn resolve_identity(
    session: &SessionContext,
    bearer: Result<Option<String>, Error>,
    state: Option<web::Data<HttpState>>,
) -> Result<VerifiedIdentity, Error> {
    if let Some(identity) = session.identity()? {
        return Ok(identity);
    }
    let Some(token) = bearer? else {
        return Err(Error::unauthorized("login required"));
    };
    let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let identity = state.accounts.authenticate_token(&token).await?;
    debug!(user_id = %identity.user_id, "resolved caller from bearer token");
    Ok(identity)
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = SessionContext::new(req.get_session());
        let bearer = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let identity = resolve_identity(&session, bearer, state).await?;
            Ok(AuthenticatedUser(identity))
        })
    }
}
