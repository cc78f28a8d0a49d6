//! Prompt catalog service.
//!
//! Implements [`PromptCatalog`] over a [`PromptRepository`]. Visibility is
//! computed here rather than in adapters: the visible set is the ADMIN
//! prompts plus the viewer's own, filtered by level afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    CreatePromptRequest, CreatePromptResponse, DeletePromptRequest, ListPromptsRequest,
    PickPromptRequest, PromptCatalog, PromptRepository, PromptRepositoryError,
};
use crate::domain::{
    Error, Level, Prompt, PromptDraft, PromptId, PromptOwner, PromptSelector, PromptText,
    ReadRetryPolicy, ThreadRngSelector, UserId,
};

fn map_repository_error(error: PromptRepositoryError) -> Error {
    match error {
        PromptRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("prompt repository unavailable: {message}"))
        }
        PromptRepositoryError::Query { message } => {
            Error::internal(format!("prompt repository error: {message}"))
        }
        PromptRepositoryError::Duplicate { prompt_id } => {
            Error::conflict(format!("prompt {prompt_id} already exists"))
        }
    }
}

/// Prompt catalog backed by a prompt repository.
#[derive(Clone)]
pub struct PromptCatalogService<R> {
    prompts: Arc<R>,
    clock: Arc<dyn Clock>,
    selector: Arc<dyn PromptSelector>,
    retry: ReadRetryPolicy,
}

impl<R> PromptCatalogService<R> {
    /// Create a catalog with thread-local randomness and default retries.
    pub fn new(prompts: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            prompts,
            clock,
            selector: Arc::new(ThreadRngSelector),
            retry: ReadRetryPolicy::default(),
        }
    }

    /// Replace the random selector.
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

impl<R> PromptCatalogService<R>
where
    R: PromptRepository,
{
    async fn prompts_owned_by(&self, owner: &PromptOwner) -> Result<Vec<Prompt>, Error> {
        let repo = self.prompts.as_ref();
        self.retry
            .run("list prompts by owner", move || repo.list_by_owner(owner))
            .await
            .map_err(map_repository_error)
    }

    async fn visible_prompts(
        &self,
        viewer: &UserId,
        level: Option<&Level>,
    ) -> Result<Vec<Prompt>, Error> {
        let mut visible = self.prompts_owned_by(&PromptOwner::Admin).await?;
        visible.extend(
            self.prompts_owned_by(&PromptOwner::User(viewer.clone()))
                .await?,
        );
        visible.retain(|prompt| prompt.is_visible_to(viewer) && prompt.matches_level(level));
        Ok(visible)
    }

    async fn find_prompt(&self, prompt_id: PromptId) -> Result<Option<Prompt>, Error> {
        let repo = self.prompts.as_ref();
        let prompt_id = &prompt_id;
        self.retry
            .run("find prompt", move || repo.find_by_id(prompt_id))
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> PromptCatalog for PromptCatalogService<R>
where
    R: PromptRepository,
{
    async fn create_prompt(
        &self,
        request: CreatePromptRequest,
    ) -> Result<CreatePromptResponse, Error> {
        let text = PromptText::new(request.text)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let level =
            Level::new(request.level).map_err(|err| Error::invalid_request(err.to_string()))?;

        let prompt = Prompt::new(PromptDraft {
            id: PromptId::random(),
            text,
            level,
            owner: PromptOwner::User(request.owner),
            public: true,
            created_at: self.clock.utc(),
        });

        self.prompts
            .insert(&prompt)
            .await
            .map_err(map_repository_error)?;

        debug!(prompt_id = %prompt.id(), owner = %prompt.owner(), "prompt created");
        Ok(CreatePromptResponse {
            prompt_id: prompt.id(),
        })
    }

    async fn list_visible(&self, request: ListPromptsRequest) -> Result<Vec<Prompt>, Error> {
        self.visible_prompts(&request.viewer, request.level.as_ref())
            .await
    }

    async fn pick_random(&self, request: PickPromptRequest) -> Result<Prompt, Error> {
        let candidates = self
            .visible_prompts(&request.viewer, Some(&request.level))
            .await?;
        self.selector.choose(candidates).ok_or_else(|| {
            Error::not_found(format!("no prompts found for level {}", request.level))
        })
    }

    async fn get_by_id(&self, prompt_id: PromptId) -> Result<Option<Prompt>, Error> {
        self.find_prompt(prompt_id).await
    }

    async fn delete_prompt(&self, request: DeletePromptRequest) -> Result<(), Error> {
        let DeletePromptRequest { caller, prompt_id } = request;
        let prompt = self
            .find_prompt(prompt_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("prompt {prompt_id} not found")))?;

        if !prompt.owner().is_user(&caller) {
            return Err(Error::forbidden("only the owner can delete this prompt"));
        }

        let deleted = self
            .prompts
            .delete(&prompt_id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(Error::not_found(format!("prompt {prompt_id} not found")));
        }
        debug!(%prompt_id, owner = %caller, "prompt deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "prompt_catalog_service_tests.rs"]
mod tests;
