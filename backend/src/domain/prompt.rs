//! Conversation prompt entities.
//!
//! A prompt is a piece of text tagged with a free-form level (`ice`,
//! `confess`, `deep`, ...). Levels compare case-insensitively. Prompts are
//! owned either by a user or by the reserved `ADMIN` owner; admin prompts are
//! visible to everyone.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{ADMIN_OWNER, UserId, UserValidationError};

/// Validation errors raised by prompt constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptValidationError {
    /// Prompt text is empty or whitespace.
    EmptyText,
    /// Level is empty or whitespace.
    EmptyLevel,
    /// Identifier is not a UUID.
    InvalidId,
    /// Stored owner is neither `ADMIN` nor a valid user id.
    InvalidOwner(UserValidationError),
}

impl fmt::Display for PromptValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "prompt text must not be empty"),
            Self::EmptyLevel => write!(f, "prompt level must not be empty"),
            Self::InvalidId => write!(f, "prompt id must be a valid UUID"),
            Self::InvalidOwner(err) => write!(f, "invalid prompt owner: {err}"),
        }
    }
}

impl std::error::Error for PromptValidationError {}

/// Globally unique prompt identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(Uuid);

impl PromptId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a textual identifier.
    pub fn parse(raw: &str) -> Result<Self, PromptValidationError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| PromptValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-blank prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptText(String);

impl PromptText {
    /// Validate and construct prompt text.
    pub fn new(text: impl Into<String>) -> Result<Self, PromptValidationError> {
        Self::from_owned(text.into())
    }

    fn from_owned(text: String) -> Result<Self, PromptValidationError> {
        if text.trim().is_empty() {
            return Err(PromptValidationError::EmptyText);
        }
        Ok(Self(text))
    }
}

impl AsRef<str> for PromptText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PromptText> for String {
    fn from(value: PromptText) -> Self {
        value.0
    }
}

impl TryFrom<String> for PromptText {
    type Error = PromptValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Free-form prompt level, compared case-insensitively.
///
/// The original spelling is preserved for display.
///
/// # Examples
/// ```
/// use promptdeck::domain::Level;
///
/// let stored = Level::new("Ice").expect("valid level");
/// let filter = Level::new("ICE").expect("valid level");
/// assert!(stored.matches(&filter));
/// assert_eq!(stored.as_ref(), "Ice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Level(String);

impl Level {
    /// Validate and construct a level.
    pub fn new(level: impl Into<String>) -> Result<Self, PromptValidationError> {
        Self::from_owned(level.into())
    }

    fn from_owned(level: String) -> Result<Self, PromptValidationError> {
        if level.trim().is_empty() {
            return Err(PromptValidationError::EmptyLevel);
        }
        Ok(Self(level))
    }

    /// Lower-cased form used for comparisons and indexed lookups.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive equality.
    #[must_use]
    pub fn matches(&self, other: &Level) -> bool {
        self.normalized() == other.normalized()
    }
}

impl AsRef<str> for Level {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Level> for String {
    fn from(value: Level) -> Self {
        value.0
    }
}

impl TryFrom<String> for Level {
    type Error = PromptValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Owner of a prompt: a user or the reserved admin sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PromptOwner {
    /// System-seeded prompt, visible to every user.
    Admin,
    /// Prompt created by a user, visible only to them.
    User(UserId),
}

impl PromptOwner {
    /// Parse the stored owner column.
    pub fn from_stored(raw: impl Into<String>) -> Result<Self, PromptValidationError> {
        let raw = raw.into();
        if raw == ADMIN_OWNER {
            return Ok(Self::Admin);
        }
        UserId::new(raw)
            .map(Self::User)
            .map_err(PromptValidationError::InvalidOwner)
    }

    /// Value stored in the owner column.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => ADMIN_OWNER,
            Self::User(id) => id.as_ref(),
        }
    }

    /// Whether `user_id` owns this prompt. Admin prompts have no user owner.
    #[must_use]
    pub fn is_user(&self, user_id: &UserId) -> bool {
        matches!(self, Self::User(owner) if owner == user_id)
    }
}

impl fmt::Display for PromptOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input used to assemble a [`Prompt`].
#[derive(Debug, Clone)]
pub struct PromptDraft {
    pub id: PromptId,
    pub text: PromptText,
    pub level: Level,
    pub owner: PromptOwner,
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored conversation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    id: PromptId,
    text: PromptText,
    level: Level,
    owner: PromptOwner,
    public: bool,
    created_at: DateTime<Utc>,
}

impl Prompt {
    /// Assemble a prompt from validated parts.
    pub fn new(draft: PromptDraft) -> Self {
        let PromptDraft {
            id,
            text,
            level,
            owner,
            public,
            created_at,
        } = draft;
        Self {
            id,
            text,
            level,
            owner,
            public,
            created_at,
        }
    }

    pub fn id(&self) -> PromptId {
        self.id
    }

    pub fn text(&self) -> &PromptText {
        &self.text
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn owner(&self) -> &PromptOwner {
        &self.owner
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Admin prompts are visible to all users; user prompts only to their owner.
    #[must_use]
    pub fn is_visible_to(&self, user_id: &UserId) -> bool {
        match &self.owner {
            PromptOwner::Admin => true,
            PromptOwner::User(owner) => owner == user_id,
        }
    }

    /// Optional level filter; `None` matches everything.
    #[must_use]
    pub fn matches_level(&self, filter: Option<&Level>) -> bool {
        filter.is_none_or(|level| self.level.matches(level))
    }
}
