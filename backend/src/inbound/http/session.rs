//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers only persist, read or clear a
//! verified identity.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Email, Error, UserId, VerifiedIdentity};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const EMAIL_KEY: &str = "email";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist a verified identity in the session cookie.
    pub fn persist_identity(&self, identity: &VerifiedIdentity) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, identity.user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        match &identity.email {
            Some(email) => self
                .0
                .insert(EMAIL_KEY, email.as_ref())
                .map_err(|error| Error::internal(format!("failed to persist session: {error}"))),
            None => {
                self.0.remove(EMAIL_KEY);
                Ok(())
            }
        }
    }

    /// Fetch the identity stored in the session, if any.
    ///
    /// A tampered or otherwise invalid user id is treated as absent.
    pub fn identity(&self) -> Result<Option<VerifiedIdentity>, Error> {
        let raw_id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw_id) = raw_id else {
            return Ok(None);
        };
        let user_id = match UserId::new(raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!("invalid user id in session cookie: {error}");
                return Ok(None);
            }
        };
        let email = self
            .0
            .get::<String>(EMAIL_KEY)
            .ok()
            .flatten()
            .and_then(|raw| Email::new(raw).ok());
        Ok(Some(VerifiedIdentity::new(user_id, email)))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
