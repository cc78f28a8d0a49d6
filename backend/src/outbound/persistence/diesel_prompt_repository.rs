//! PostgreSQL-backed `PromptRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PromptRepository, PromptRepositoryError};
use crate::domain::{Level, Prompt, PromptDraft, PromptId, PromptOwner, PromptText};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewPromptRow, PromptRow};
use super::pool::{DbPool, PoolError};
use super::schema::prompts;

/// Diesel-backed implementation of the prompt repository port.
#[derive(Clone)]
pub struct DieselPromptRepository {
    pool: DbPool,
}

impl DieselPromptRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PromptRepositoryError {
    map_basic_pool_error(error, PromptRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PromptRepositoryError {
    map_basic_diesel_error(
        error,
        PromptRepositoryError::query,
        PromptRepositoryError::connection,
    )
}

fn row_to_prompt(row: PromptRow) -> Result<Prompt, PromptRepositoryError> {
    let PromptRow {
        prompt_id,
        text,
        level,
        owner_id,
        public,
        created_at,
    } = row;
    let invalid = |err: crate::domain::PromptValidationError| {
        PromptRepositoryError::query(format!("stored prompt {prompt_id} is invalid: {err}"))
    };

    Ok(Prompt::new(PromptDraft {
        id: PromptId::from_uuid(prompt_id),
        text: PromptText::new(text).map_err(invalid)?,
        level: Level::new(level).map_err(invalid)?,
        owner: PromptOwner::from_stored(owner_id).map_err(invalid)?,
        public,
        created_at,
    }))
}

#[async_trait]
impl PromptRepository for DieselPromptRepository {
    async fn insert(&self, prompt: &Prompt) -> Result<(), PromptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPromptRow {
            prompt_id: *prompt.id().as_uuid(),
            text: prompt.text().as_ref(),
            level: prompt.level().as_ref(),
            owner_id: prompt.owner().as_str(),
            public: prompt.is_public(),
            created_at: prompt.created_at(),
        };

        let inserted = diesel::insert_into(prompts::table)
            .values(&row)
            .on_conflict(prompts::prompt_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if inserted == 0 {
            return Err(PromptRepositoryError::duplicate(prompt.id()));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        prompt_id: &PromptId,
    ) -> Result<Option<Prompt>, PromptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PromptRow> = prompts::table
            .filter(prompts::prompt_id.eq(*prompt_id.as_uuid()))
            .select(PromptRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_prompt).transpose()
    }

    async fn list_by_owner(
        &self,
        owner: &PromptOwner,
    ) -> Result<Vec<Prompt>, PromptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PromptRow> = prompts::table
            .filter(prompts::owner_id.eq(owner.as_str()))
            .order((prompts::created_at.asc(), prompts::prompt_id.asc()))
            .select(PromptRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_prompt).collect()
    }

    async fn delete(&self, prompt_id: &PromptId) -> Result<bool, PromptRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = prompts::table.filter(prompts::prompt_id.eq(*prompt_id.as_uuid()));
        let deleted = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
