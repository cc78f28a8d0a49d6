//! Port for prompt persistence.

use async_trait::async_trait;

use crate::domain::{Prompt, PromptId, PromptOwner};

use super::define_port_error;

define_port_error! {
    /// Errors raised by prompt repository adapters.
    pub enum PromptRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "prompt repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "prompt repository query failed: {message}",
        /// A prompt with the same identifier is already stored.
        Duplicate { prompt_id: PromptId } =>
            "prompt {prompt_id} already exists",
    }
}

impl PromptRepositoryError {
    /// Whether retrying the same read could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Port for reading and writing prompts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// Store a new prompt. Fails with `Duplicate` when the id is taken.
    async fn insert(&self, prompt: &Prompt) -> Result<(), PromptRepositoryError>;

    /// Find a prompt by id regardless of owner.
    async fn find_by_id(&self, prompt_id: &PromptId)
    -> Result<Option<Prompt>, PromptRepositoryError>;

    /// List every prompt stored under `owner`, oldest first.
    async fn list_by_owner(&self, owner: &PromptOwner)
    -> Result<Vec<Prompt>, PromptRepositoryError>;

    /// Remove a prompt. Returns `false` when nothing was deleted.
    async fn delete(&self, prompt_id: &PromptId) -> Result<bool, PromptRepositoryError>;
}

/// Fixture implementation for tests that do not exercise prompt storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePromptRepository;

#[async_trait]
impl PromptRepository for FixturePromptRepository {
    async fn insert(&self, _prompt: &Prompt) -> Result<(), PromptRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _prompt_id: &PromptId,
    ) -> Result<Option<Prompt>, PromptRepositoryError> {
        Ok(None)
    }

    async fn list_by_owner(
        &self,
        _owner: &PromptOwner,
    ) -> Result<Vec<Prompt>, PromptRepositoryError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _prompt_id: &PromptId) -> Result<bool, PromptRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reads_are_empty() {
        let repo = FixturePromptRepository;
        assert!(
            repo.find_by_id(&PromptId::random())
                .await
                .expect("fixture lookup succeeds")
                .is_none()
        );
        assert!(
            repo.list_by_owner(&PromptOwner::Admin)
                .await
                .expect("fixture list succeeds")
                .is_empty()
        );
    }

    #[rstest]
    #[case(PromptRepositoryError::connection("refused"), true)]
    #[case(PromptRepositoryError::query("syntax"), false)]
    #[case(PromptRepositoryError::duplicate(PromptId::random()), false)]
    fn only_connection_failures_are_transient(
        #[case] error: PromptRepositoryError,
        #[case] expected: bool,
    ) {
        assert_eq!(error.is_transient(), expected);
    }
}
