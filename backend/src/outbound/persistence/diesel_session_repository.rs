//! PostgreSQL-backed `SessionRepository` implementation using Diesel ORM.
//!
//! A session is a header row in `prompt_sessions` plus one row per entry in
//! `session_entries`. Responses are written with a conditional `UPDATE ...
//! WHERE response IS NULL`, so two concurrent responders cannot overwrite
//! each other; the loser sees the winner's value.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ResponseWriteOutcome, SessionRepository, SessionRepositoryError};
use crate::domain::{
    Level, PromptId, PromptSession, PromptSessionDraft, PromptText, SessionId,
    SessionPromptEntry, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewPromptSessionRow, NewSessionEntryRow, PromptSessionRow, SessionEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{prompt_sessions, session_entries};

/// Diesel-backed implementation of the session repository port.
#[derive(Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SessionRepositoryError {
    map_basic_pool_error(error, SessionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SessionRepositoryError {
    map_basic_diesel_error(
        error,
        SessionRepositoryError::query,
        SessionRepositoryError::connection,
    )
}

fn corrupt(message: impl std::fmt::Display) -> SessionRepositoryError {
    SessionRepositoryError::query(format!("stored session is invalid: {message}"))
}

fn entry_from_row(row: SessionEntryRow) -> Result<SessionPromptEntry, SessionRepositoryError> {
    Ok(SessionPromptEntry {
        prompt_id: PromptId::from_uuid(row.prompt_id),
        text: PromptText::new(row.text).map_err(corrupt)?,
        level: Level::new(row.level).map_err(corrupt)?,
        response: row.response,
    })
}

fn session_from_rows(
    header: PromptSessionRow,
    entries: Vec<SessionEntryRow>,
) -> Result<PromptSession, SessionRepositoryError> {
    let entries = entries
        .into_iter()
        .map(entry_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    PromptSession::new(PromptSessionDraft {
        id: SessionId::new(header.session_id).map_err(corrupt)?,
        owner: UserId::new(header.owner_id).map_err(corrupt)?,
        created_at: header.created_at,
        entries,
    })
    .map_err(corrupt)
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn insert(&self, session: &PromptSession) -> Result<(), SessionRepositoryError> {
        let owner_id = session.owner().as_ref();
        let session_id = session.id().as_ref();
        let header = NewPromptSessionRow {
            owner_id,
            session_id,
            created_at: session.created_at(),
        };
        let entries = session
            .entries()
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                Ok(NewSessionEntryRow {
                    owner_id,
                    session_id,
                    prompt_id: *entry.prompt_id.as_uuid(),
                    position: i32::try_from(position).map_err(corrupt)?,
                    text: entry.text.as_ref(),
                    level: entry.level.as_ref(),
                    response: entry.response.as_deref(),
                })
            })
            .collect::<Result<Vec<_>, SessionRepositoryError>>()?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let created = conn
            .transaction(|conn| {
                async move {
                    let inserted = diesel::insert_into(prompt_sessions::table)
                        .values(&header)
                        .on_conflict((prompt_sessions::owner_id, prompt_sessions::session_id))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted == 0 {
                        return Ok(false);
                    }
                    if !entries.is_empty() {
                        diesel::insert_into(session_entries::table)
                            .values(&entries)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if !created {
            return Err(SessionRepositoryError::duplicate(session.id().clone()));
        }
        Ok(())
    }

    async fn find(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<Option<PromptSession>, SessionRepositoryError> {
        let owner_id = owner.as_ref();
        let session_key = session_id.as_ref();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = conn
            .transaction(|conn| {
                async move {
                    let header: Option<PromptSessionRow> = prompt_sessions::table
                        .filter(prompt_sessions::owner_id.eq(owner_id))
                        .filter(prompt_sessions::session_id.eq(session_key))
                        .select(PromptSessionRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(header) = header else {
                        return Ok(None);
                    };
                    let entries: Vec<SessionEntryRow> = session_entries::table
                        .filter(session_entries::owner_id.eq(owner_id))
                        .filter(session_entries::session_id.eq(session_key))
                        .order(session_entries::position.asc())
                        .select(SessionEntryRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some((header, entries)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        rows.map(|(header, entries)| session_from_rows(header, entries))
            .transpose()
    }

    async fn list_owners(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<UserId>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owners: Vec<String> = prompt_sessions::table
            .filter(prompt_sessions::session_id.eq(session_id.as_ref()))
            .select(prompt_sessions::owner_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        owners
            .into_iter()
            .map(|owner| UserId::new(owner).map_err(corrupt))
            .collect()
    }

    async fn record_response(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        prompt_id: &PromptId,
        response: &str,
    ) -> Result<ResponseWriteOutcome, SessionRepositoryError> {
        let owner_id = owner.as_ref();
        let session_key = session_id.as_ref();
        let prompt_key = *prompt_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let entry = || {
                    session_entries::table
                        .filter(session_entries::owner_id.eq(owner_id))
                        .filter(session_entries::session_id.eq(session_key))
                        .filter(session_entries::prompt_id.eq(prompt_key))
                };

                let updated = diesel::update(entry().filter(session_entries::response.is_null()))
                    .set(session_entries::response.eq(response))
                    .execute(conn)
                    .await?;
                if updated == 1 {
                    return Ok(ResponseWriteOutcome::Recorded);
                }

                let existing: Option<Option<String>> = entry()
                    .select(session_entries::response)
                    .first(conn)
                    .await
                    .optional()?;
                if let Some(existing) = existing {
                    // A null here means the row changed between the two
                    // statements; report it as answered with no value.
                    return Ok(ResponseWriteOutcome::AlreadyAnswered {
                        existing: existing.unwrap_or_default(),
                    });
                }

                let session_exists: bool = diesel::select(diesel::dsl::exists(
                    prompt_sessions::table
                        .filter(prompt_sessions::owner_id.eq(owner_id))
                        .filter(prompt_sessions::session_id.eq(session_key)),
                ))
                .get_result(conn)
                .await?;
                Ok::<_, diesel::result::Error>(if session_exists {
                    ResponseWriteOutcome::EntryMissing
                } else {
                    ResponseWriteOutcome::SessionMissing
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<bool, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = prompt_sessions::table
            .filter(prompt_sessions::owner_id.eq(owner.as_ref()))
            .filter(prompt_sessions::session_id.eq(session_id.as_ref()));
        let deleted = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
