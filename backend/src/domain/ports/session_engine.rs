//! Driving port for prompt sessions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Level, PromptId, PromptSession, SessionId, SessionPromptEntry, UserId};

/// Serializable session entry for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntryPayload {
    pub prompt_id: PromptId,
    pub text: String,
    pub level: String,
    pub response: Option<String>,
}

impl From<SessionPromptEntry> for SessionEntryPayload {
    fn from(value: SessionPromptEntry) -> Self {
        Self {
            prompt_id: value.prompt_id,
            text: value.text.into(),
            level: value.level.into(),
            response: value.response,
        }
    }
}

/// Request to start a session named `session_id` for `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionRequest {
    pub owner: UserId,
    pub session_id: SessionId,
    pub level: Option<Level>,
}

/// Response from starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub prompt_count: usize,
}

/// Addresses one session in its owner's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLookup {
    pub owner: UserId,
    pub session_id: SessionId,
}

/// Request to record a response for one session entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResponseRequest {
    pub owner: UserId,
    pub session_id: SessionId,
    pub prompt_id: PromptId,
    pub response: String,
}

/// Driving port for session lifecycle operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionEngine: Send + Sync {
    /// Draw up to ten shuffled visible prompts into a new session.
    ///
    /// Fails with `conflict` when the owner already has a session with this
    /// identifier and with `not_found` when no visible prompt matches.
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<StartSessionResponse, Error>;

    /// Fetch the caller's session.
    async fn get_session(&self, lookup: SessionLookup) -> Result<PromptSession, Error>;

    /// Record a response once per entry. A second attempt is a `conflict`
    /// whose details carry the existing response.
    async fn record_response(&self, request: RecordResponseRequest) -> Result<(), Error>;

    /// Delete the caller's session.
    ///
    /// `not_found` when no owner holds the identifier, `forbidden` when only
    /// other users do.
    async fn delete_session(&self, lookup: SessionLookup) -> Result<(), Error>;
}
