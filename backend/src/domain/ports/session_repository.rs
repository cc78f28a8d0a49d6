//! Port for prompt session persistence.
//!
//! Writes are conditional: inserting a session never overwrites an existing
//! one, and a response is recorded only while the entry is still unanswered.
//! Adapters must make both checks atomic with the write.

use async_trait::async_trait;

use crate::domain::{PromptId, PromptSession, SessionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session repository adapters.
    pub enum SessionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "session repository query failed: {message}",
        /// The owner already has a session with this identifier.
        Duplicate { session_id: SessionId } =>
            "session {session_id} already exists",
    }
}

impl SessionRepositoryError {
    /// Whether retrying the same read could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Result of a conditional response write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseWriteOutcome {
    /// The response was stored.
    Recorded,
    /// The entry already held a response, which is returned unchanged.
    AlreadyAnswered { existing: String },
    /// The session exists but has no entry for the prompt.
    EntryMissing,
    /// No session matches the owner and identifier.
    SessionMissing,
}

/// Port for reading and writing prompt sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session. Fails with `Duplicate` if the owner already has
    /// one with the same identifier.
    async fn insert(&self, session: &PromptSession) -> Result<(), SessionRepositoryError>;

    /// Find a session owned by `owner`.
    async fn find(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<Option<PromptSession>, SessionRepositoryError>;

    /// List every user holding a session with this identifier.
    async fn list_owners(&self, session_id: &SessionId)
    -> Result<Vec<UserId>, SessionRepositoryError>;

    /// Record `response` for one entry if it is still unanswered.
    async fn record_response(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        prompt_id: &PromptId,
        response: &str,
    ) -> Result<ResponseWriteOutcome, SessionRepositoryError>;

    /// Delete a session with all of its entries. Returns `false` when nothing
    /// was deleted.
    async fn delete(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<bool, SessionRepositoryError>;
}

/// Fixture implementation for tests that do not exercise session storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSessionRepository;

#[async_trait]
impl SessionRepository for FixtureSessionRepository {
    async fn insert(&self, _session: &PromptSession) -> Result<(), SessionRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _owner: &UserId,
        _session_id: &SessionId,
    ) -> Result<Option<PromptSession>, SessionRepositoryError> {
        Ok(None)
    }

    async fn list_owners(
        &self,
        _session_id: &SessionId,
    ) -> Result<Vec<UserId>, SessionRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_response(
        &self,
        _owner: &UserId,
        _session_id: &SessionId,
        _prompt_id: &PromptId,
        _response: &str,
    ) -> Result<ResponseWriteOutcome, SessionRepositoryError> {
        Ok(ResponseWriteOutcome::SessionMissing)
    }

    async fn delete(
        &self,
        _owner: &UserId,
        _session_id: &SessionId,
    ) -> Result<bool, SessionRepositoryError> {
        Ok(false)
    }
}
