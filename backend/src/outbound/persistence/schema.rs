//! Diesel table definitions for the prompt store.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Users seen at authentication time, keyed by the provider subject.
    users (user_id) {
        user_id -> Text,
        email -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Conversation prompts. `owner_id` is a user id or `ADMIN`.
    prompts (prompt_id) {
        prompt_id -> Uuid,
        text -> Text,
        level -> Text,
        owner_id -> Text,
        public -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Session headers keyed by (owner, session id).
    prompt_sessions (owner_id, session_id) {
        owner_id -> Text,
        session_id -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Snapshotted prompts inside a session, ordered by `position`.
    session_entries (owner_id, session_id, prompt_id) {
        owner_id -> Text,
        session_id -> Text,
        prompt_id -> Uuid,
        position -> Int4,
        text -> Text,
        level -> Text,
        response -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, prompts, prompt_sessions, session_entries);
