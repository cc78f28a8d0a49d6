//! Prompt sessions: a caller-named, ordered set of up to ten prompts with
//! at most one recorded response per entry.
//!
//! Sessions are keyed by `(owner, session id)`. Entry text and level are
//! snapshotted when the session starts, so later prompt deletions do not
//! change a running session.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prompt::{Level, Prompt, PromptId, PromptText};
use super::user::UserId;

/// Maximum number of prompts drawn into a session.
pub const SESSION_PROMPT_LIMIT: usize = 10;

/// Validation errors raised by session constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    /// Session id is empty or whitespace.
    EmptyId,
    /// Session id carries leading or trailing whitespace.
    PaddedId,
    /// More entries than a session may hold.
    TooManyEntries { max: usize, actual: usize },
    /// The same prompt appears twice.
    DuplicatePrompt(PromptId),
}

impl fmt::Display for SessionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "session id must not be empty"),
            Self::PaddedId => write!(f, "session id must not have surrounding whitespace"),
            Self::TooManyEntries { max, actual } => {
                write!(f, "session may hold at most {max} prompts, got {actual}")
            }
            Self::DuplicatePrompt(id) => write!(f, "prompt {id} appears more than once"),
        }
    }
}

impl std::error::Error for SessionValidationError {}

/// Caller-supplied session identifier, unique per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate and construct a session identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, SessionValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, SessionValidationError> {
        if id.trim().is_empty() {
            return Err(SessionValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(SessionValidationError::PaddedId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// One prompt inside a session, with its snapshot and optional response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPromptEntry {
    pub prompt_id: PromptId,
    pub text: PromptText,
    pub level: Level,
    pub response: Option<String>,
}

impl SessionPromptEntry {
    /// Snapshot a prompt as an unanswered entry.
    pub fn unanswered(prompt: &Prompt) -> Self {
        Self {
            prompt_id: prompt.id(),
            text: prompt.text().clone(),
            level: prompt.level().clone(),
            response: None,
        }
    }
}

/// Input used to assemble a [`PromptSession`].
#[derive(Debug, Clone)]
pub struct PromptSessionDraft {
    pub id: SessionId,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<SessionPromptEntry>,
}

/// A prompt session owned by a single user.
///
/// ## Invariants
/// - At most [`SESSION_PROMPT_LIMIT`] entries.
/// - Prompt identifiers are unique within the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSession {
    id: SessionId,
    owner: UserId,
    created_at: DateTime<Utc>,
    entries: Vec<SessionPromptEntry>,
}

impl PromptSession {
    /// Validate and assemble a session.
    pub fn new(draft: PromptSessionDraft) -> Result<Self, SessionValidationError> {
        let PromptSessionDraft {
            id,
            owner,
            created_at,
            entries,
        } = draft;

        if entries.len() > SESSION_PROMPT_LIMIT {
            return Err(SessionValidationError::TooManyEntries {
                max: SESSION_PROMPT_LIMIT,
                actual: entries.len(),
            });
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.prompt_id) {
                return Err(SessionValidationError::DuplicatePrompt(entry.prompt_id));
            }
        }

        Ok(Self {
            id,
            owner,
            created_at,
            entries,
        })
    }

    /// Start a session from an already shuffled candidate list, keeping the
    /// first [`SESSION_PROMPT_LIMIT`] distinct prompts.
    pub fn start(
        id: SessionId,
        owner: UserId,
        created_at: DateTime<Utc>,
        candidates: &[Prompt],
    ) -> Result<Self, SessionValidationError> {
        let mut seen = HashSet::new();
        let entries = candidates
            .iter()
            .filter(|prompt| seen.insert(prompt.id()))
            .take(SESSION_PROMPT_LIMIT)
            .map(SessionPromptEntry::unanswered)
            .collect();
        Self::new(PromptSessionDraft {
            id,
            owner,
            created_at,
            entries,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn entries(&self) -> &[SessionPromptEntry] {
        &self.entries
    }

    /// Consume the session, yielding its entries in order.
    pub fn into_entries(self) -> Vec<SessionPromptEntry> {
        self.entries
    }

    /// Find the entry for `prompt_id`.
    pub fn entry(&self, prompt_id: PromptId) -> Option<&SessionPromptEntry> {
        self.entries
            .iter()
            .find(|entry| entry.prompt_id == prompt_id)
    }
}
