//! Driving port for the prompt catalog.
//!
//! The catalog owns prompt creation, visibility, random selection and owner
//! deletion. Visibility is the union of ADMIN prompts and the caller's own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Level, Prompt, PromptId, UserId};

/// Serializable prompt payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub prompt_id: PromptId,
    pub text: String,
    pub level: String,
    pub owner_id: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Prompt> for PromptPayload {
    fn from(value: Prompt) -> Self {
        Self {
            prompt_id: value.id(),
            text: value.text().as_ref().to_owned(),
            level: value.level().as_ref().to_owned(),
            owner_id: value.owner().as_str().to_owned(),
            public: value.is_public(),
            created_at: value.created_at(),
        }
    }
}

/// Request to create a prompt owned by `owner`.
///
/// Text and level arrive unvalidated; the catalog rejects blank values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePromptRequest {
    pub owner: UserId,
    pub text: String,
    pub level: String,
}

/// Response from creating a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePromptResponse {
    pub prompt_id: PromptId,
}

/// Request to list prompts visible to `viewer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPromptsRequest {
    pub viewer: UserId,
    pub level: Option<Level>,
}

/// Request to pick one random prompt at a given level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickPromptRequest {
    pub viewer: UserId,
    pub level: Level,
}

/// Request to delete a prompt on behalf of `caller`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePromptRequest {
    pub caller: UserId,
    pub prompt_id: PromptId,
}

/// Driving port for prompt catalog operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptCatalog: Send + Sync {
    /// Store a new public prompt and return its generated identifier.
    async fn create_prompt(
        &self,
        request: CreatePromptRequest,
    ) -> Result<CreatePromptResponse, Error>;

    /// ADMIN prompts plus the viewer's own, optionally filtered by level.
    async fn list_visible(&self, request: ListPromptsRequest) -> Result<Vec<Prompt>, Error>;

    /// Uniformly random prompt from the visible set at `level`.
    ///
    /// Fails with `not_found` when nothing matches.
    async fn pick_random(&self, request: PickPromptRequest) -> Result<Prompt, Error>;

    /// Point lookup; absence is not an error.
    async fn get_by_id(&self, prompt_id: PromptId) -> Result<Option<Prompt>, Error>;

    /// Delete a prompt owned by the caller.
    ///
    /// Existence is checked before ownership, so a missing prompt is
    /// `not_found` and someone else's (or an ADMIN) prompt is `forbidden`.
    async fn delete_prompt(&self, request: DeletePromptRequest) -> Result<(), Error>;
}
