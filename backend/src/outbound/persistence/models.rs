//! Internal Diesel row structs for the prompt store.
//!
//! These types never leave the persistence layer; repositories convert them
//! into validated domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{prompt_sessions, prompts, session_entries, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: String,
    pub email: Option<String>,
    #[expect(dead_code, reason = "audit column not surfaced in the domain")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for recording a first authentication.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub user_id: &'a str,
    pub email: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Prompt models
// ---------------------------------------------------------------------------

/// Row struct for reading from the prompts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prompts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PromptRow {
    pub prompt_id: Uuid,
    pub text: String,
    pub level: String,
    pub owner_id: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new prompts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prompts)]
pub(crate) struct NewPromptRow<'a> {
    pub prompt_id: Uuid,
    pub text: &'a str,
    pub level: &'a str,
    pub owner_id: &'a str,
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Session models
// ---------------------------------------------------------------------------

/// Row struct for reading session headers.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prompt_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PromptSessionRow {
    pub owner_id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new session headers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prompt_sessions)]
pub(crate) struct NewPromptSessionRow<'a> {
    pub owner_id: &'a str,
    pub session_id: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading session entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = session_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionEntryRow {
    pub prompt_id: Uuid,
    pub text: String,
    pub level: String,
    pub response: Option<String>,
}

/// Insertable struct for session entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = session_entries)]
pub(crate) struct NewSessionEntryRow<'a> {
    pub owner_id: &'a str,
    pub session_id: &'a str,
    pub prompt_id: Uuid,
    pub position: i32,
    pub text: &'a str,
    pub level: &'a str,
    pub response: Option<&'a str>,
}
