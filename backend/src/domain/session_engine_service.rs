//! Session engine service.
//!
//! Draws sessions from the prompt catalog's visible set and stores them
//! through [`SessionRepository`]. Response recording relies on the
//! repository's conditional write; this service only translates outcomes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    ListPromptsRequest, PromptCatalog, RecordResponseRequest, ResponseWriteOutcome,
    SessionEngine, SessionLookup, SessionRepository, SessionRepositoryError, StartSessionRequest,
    StartSessionResponse,
};
use crate::domain::{
    Error, PromptSelector, PromptSession, ReadRetryPolicy, ThreadRngSelector,
};

fn map_repository_error(error: SessionRepositoryError) -> Error {
    match error {
        SessionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("session repository unavailable: {message}"))
        }
        SessionRepositoryError::Query { message } => {
            Error::internal(format!("session repository error: {message}"))
        }
        SessionRepositoryError::Duplicate { session_id } => {
            Error::conflict(format!("session {session_id} already exists"))
        }
    }
}

/// Session engine backed by a session repository and the prompt catalog.
#[derive(Clone)]
pub struct SessionEngineService<S, C> {
    sessions: Arc<S>,
    catalog: Arc<C>,
    clock: Arc<dyn Clock>,
    selector: Arc<dyn PromptSelector>,
    retry: ReadRetryPolicy,
}

impl<S, C> SessionEngineService<S, C> {
    /// Create an engine with thread-local randomness and default retries.
    pub fn new(sessions: Arc<S>, catalog: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            catalog,
            clock,
            selector: Arc::new(ThreadRngSelector),
            retry: ReadRetryPolicy::default(),
        }
    }

    /// Replace the random selector used to shuffle candidates.
    pub fn with_selector(mut self, selector: Arc<dyn PromptSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the read retry policy.
    pub fn with_retry_policy(mut self, retry: ReadRetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl<S, C> SessionEngine for SessionEngineService<S, C>
where
    S: SessionRepository,
    C: PromptCatalog,
{
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<StartSessionResponse, Error> {
        let StartSessionRequest {
            owner,
            session_id,
            level,
        } = request;

        let mut candidates = self
            .catalog
            .list_visible(ListPromptsRequest {
                viewer: owner.clone(),
                level: level.clone(),
            })
            .await?;
        if candidates.is_empty() {
            let message = match &level {
                Some(level) => format!("no prompts available for level {level}"),
                None => "no prompts available".to_owned(),
            };
            return Err(Error::not_found(message));
        }
        self.selector.shuffle(&mut candidates);

        let session = PromptSession::start(session_id, owner, self.clock.utc(), &candidates)
            .map_err(|err| Error::internal(format!("failed to assemble session: {err}")))?;

        self.sessions
            .insert(&session)
            .await
            .map_err(map_repository_error)?;

        info!(
            session_id = %session.id(),
            owner = %session.owner(),
            prompts = session.entries().len(),
            "session started"
        );
        Ok(StartSessionResponse {
            session_id: session.id().clone(),
            prompt_count: session.entries().len(),
        })
    }

    async fn get_session(&self, lookup: SessionLookup) -> Result<PromptSession, Error> {
        let repo = self.sessions.as_ref();
        let SessionLookup { owner, session_id } = &lookup;
        self.retry
            .run("find session", move || repo.find(owner, session_id))
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("session {session_id} not found")))
    }

    async fn record_response(&self, request: RecordResponseRequest) -> Result<(), Error> {
        let RecordResponseRequest {
            owner,
            session_id,
            prompt_id,
            response,
        } = request;

        let outcome = self
            .sessions
            .record_response(&owner, &session_id, &prompt_id, &response)
            .await
            .map_err(map_repository_error)?;

        match outcome {
            ResponseWriteOutcome::Recorded => {
                debug!(%session_id, %prompt_id, %owner, "response recorded");
                Ok(())
            }
            ResponseWriteOutcome::AlreadyAnswered { existing } => {
                Err(Error::conflict("response already exists").with_details(json!({
                    "prompt_id": prompt_id,
                    "existing_response": existing,
                })))
            }
            ResponseWriteOutcome::EntryMissing => Err(Error::not_found(format!(
                "prompt {prompt_id} is not part of session {session_id}"
            ))),
            ResponseWriteOutcome::SessionMissing => {
                Err(Error::not_found(format!("session {session_id} not found")))
            }
        }
    }

    async fn delete_session(&self, lookup: SessionLookup) -> Result<(), Error> {
        let repo = self.sessions.as_ref();
        let SessionLookup { owner, session_id } = &lookup;

        let owners = self
            .retry
            .run("list session owners", move || repo.list_owners(session_id))
            .await
            .map_err(map_repository_error)?;
        if owners.is_empty() {
            return Err(Error::not_found(format!("session {session_id} not found")));
        }
        if !owners.contains(owner) {
            return Err(Error::forbidden("only the owner can delete this session"));
        }

        let deleted = repo
            .delete(owner, session_id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(Error::not_found(format!("session {session_id} not found")));
        }
        info!(%session_id, %owner, "session deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_engine_service_tests.rs"]
mod tests;
