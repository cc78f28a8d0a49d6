//! In-process prompt store used when no database is configured.
//!
//! One mutex guards all three collections so conditional writes (session
//! insert, response recording) observe and update state atomically. Data is
//! lost when the process exits.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    PromptRepository, PromptRepositoryError, ResponseWriteOutcome, SessionRepository,
    SessionRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Prompt, PromptId, PromptOwner, PromptSession, PromptSessionDraft, SessionId, User, UserId,
};

#[derive(Debug, Default)]
struct StoreState {
    prompts: Vec<Prompt>,
    sessions: HashMap<(UserId, SessionId), PromptSession>,
    users: HashMap<UserId, User>,
}

/// Mutex-guarded store implementing every repository port.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use promptdeck::outbound::memory::MemoryPromptStore;
///
/// let store = Arc::new(MemoryPromptStore::default());
/// assert_eq!(store.prompt_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryPromptStore {
    state: Mutex<StoreState>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl MemoryPromptStore {
    fn lock(&self) -> Option<MutexGuard<'_, StoreState>> {
        self.state.lock().ok()
    }

    /// Number of stored prompts across every owner.
    pub fn prompt_count(&self) -> usize {
        self.lock().map_or(0, |state| state.prompts.len())
    }
}

#[async_trait]
impl PromptRepository for MemoryPromptStore {
    async fn insert(&self, prompt: &Prompt) -> Result<(), PromptRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| PromptRepositoryError::query(POISONED))?;
        if state.prompts.iter().any(|stored| stored.id() == prompt.id()) {
            return Err(PromptRepositoryError::duplicate(prompt.id()));
        }
        state.prompts.push(prompt.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        prompt_id: &PromptId,
    ) -> Result<Option<Prompt>, PromptRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| PromptRepositoryError::query(POISONED))?;
        Ok(state
            .prompts
            .iter()
            .find(|prompt| prompt.id() == *prompt_id)
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner: &PromptOwner,
    ) -> Result<Vec<Prompt>, PromptRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| PromptRepositoryError::query(POISONED))?;
        Ok(state
            .prompts
            .iter()
            .filter(|prompt| prompt.owner() == owner)
            .cloned()
            .collect())
    }

    async fn delete(&self, prompt_id: &PromptId) -> Result<bool, PromptRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| PromptRepositoryError::query(POISONED))?;
        let before = state.prompts.len();
        state.prompts.retain(|prompt| prompt.id() != *prompt_id);
        Ok(state.prompts.len() < before)
    }
}

#[async_trait]
impl SessionRepository for MemoryPromptStore {
    async fn insert(&self, session: &PromptSession) -> Result<(), SessionRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| SessionRepositoryError::query(POISONED))?;
        let key = (session.owner().clone(), session.id().clone());
        if state.sessions.contains_key(&key) {
            return Err(SessionRepositoryError::duplicate(session.id().clone()));
        }
        state.sessions.insert(key, session.clone());
        Ok(())
    }

    async fn find(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<Option<PromptSession>, SessionRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| SessionRepositoryError::query(POISONED))?;
        Ok(state
            .sessions
            .get(&(owner.clone(), session_id.clone()))
            .cloned())
    }

    async fn list_owners(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<UserId>, SessionRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| SessionRepositoryError::query(POISONED))?;
        Ok(state
            .sessions
            .keys()
            .filter(|(_, id)| id == session_id)
            .map(|(owner, _)| owner.clone())
            .collect())
    }

    async fn record_response(
        &self,
        owner: &UserId,
        session_id: &SessionId,
        prompt_id: &PromptId,
        response: &str,
    ) -> Result<ResponseWriteOutcome, SessionRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| SessionRepositoryError::query(POISONED))?;
        let key = (owner.clone(), session_id.clone());
        let Some(session) = state.sessions.get(&key) else {
            return Ok(ResponseWriteOutcome::SessionMissing);
        };
        match session.entry(*prompt_id) {
            None => return Ok(ResponseWriteOutcome::EntryMissing),
            Some(entry) => {
                if let Some(existing) = &entry.response {
                    return Ok(ResponseWriteOutcome::AlreadyAnswered {
                        existing: existing.clone(),
                    });
                }
            }
        }

        let created_at = session.created_at();
        let mut entries = session.entries().to_vec();
        for entry in entries.iter_mut().filter(|entry| entry.prompt_id == *prompt_id) {
            entry.response = Some(response.to_owned());
        }
        let updated = PromptSession::new(PromptSessionDraft {
            id: session_id.clone(),
            owner: owner.clone(),
            created_at,
            entries,
        })
        .map_err(|err| SessionRepositoryError::query(err.to_string()))?;
        state.sessions.insert(key, updated);
        Ok(ResponseWriteOutcome::Recorded)
    }

    async fn delete(
        &self,
        owner: &UserId,
        session_id: &SessionId,
    ) -> Result<bool, SessionRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| SessionRepositoryError::query(POISONED))?;
        Ok(state
            .sessions
            .remove(&(owner.clone(), session_id.clone()))
            .is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryPromptStore {
    async fn ensure(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| UserRepositoryError::query(POISONED))?;
        if state.users.contains_key(user.id()) {
            return Ok(false);
        }
        state.users.insert(user.id().clone(), user.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| UserRepositoryError::query(POISONED))?;
        Ok(state.users.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{Level, PromptDraft, PromptText};

    fn prompt(owner: PromptOwner) -> Prompt {
        Prompt::new(PromptDraft {
            id: PromptId::random(),
            text: PromptText::new("What made you laugh today?").expect("valid text"),
            level: Level::new("Ice").expect("valid level"),
            owner,
            public: true,
            created_at: Utc::now(),
        })
    }

    fn owner(raw: &str) -> UserId {
        UserId::new(raw).expect("valid user id")
    }

    fn session_id() -> SessionId {
        SessionId::new("s1").expect("valid session id")
    }

    #[fixture]
    fn store() -> MemoryPromptStore {
        MemoryPromptStore::default()
    }

    #[rstest]
    #[tokio::test]
    async fn prompts_are_listed_per_owner(store: MemoryPromptStore) {
        let admin = prompt(PromptOwner::Admin);
        let mine = prompt(PromptOwner::User(owner("sub-1")));
        PromptRepository::insert(&store, &admin).await.expect("insert");
        PromptRepository::insert(&store, &mine).await.expect("insert");

        let listed = store
            .list_by_owner(&PromptOwner::Admin)
            .await
            .expect("list");
        assert_eq!(listed, vec![admin]);
        assert_eq!(store.prompt_count(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_prompt_ids_are_rejected(store: MemoryPromptStore) {
        let admin = prompt(PromptOwner::Admin);
        PromptRepository::insert(&store, &admin).await.expect("insert");
        let err = PromptRepository::insert(&store, &admin)
            .await
            .expect_err("duplicate");
        assert!(matches!(err, PromptRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_twice_reports_false(store: MemoryPromptStore) {
        let admin = prompt(PromptOwner::Admin);
        PromptRepository::insert(&store, &admin).await.expect("insert");
        assert!(PromptRepository::delete(&store, &admin.id()).await.expect("delete"));
        assert!(!PromptRepository::delete(&store, &admin.id()).await.expect("delete"));
    }

    #[rstest]
    #[tokio::test]
    async fn first_response_wins(store: MemoryPromptStore) {
        let candidate = prompt(PromptOwner::Admin);
        let session =
            PromptSession::start(session_id(), owner("sub-1"), Utc::now(), &[candidate.clone()])
                .expect("valid session");
        SessionRepository::insert(&store, &session).await.expect("insert");

        let first = store
            .record_response(&owner("sub-1"), &session_id(), &candidate.id(), "first")
            .await
            .expect("write");
        let second = store
            .record_response(&owner("sub-1"), &session_id(), &candidate.id(), "second")
            .await
            .expect("write");

        assert_eq!(first, ResponseWriteOutcome::Recorded);
        assert_eq!(
            second,
            ResponseWriteOutcome::AlreadyAnswered {
                existing: "first".to_owned()
            }
        );
        let stored = store
            .find(&owner("sub-1"), &session_id())
            .await
            .expect("find")
            .expect("session exists");
        assert_eq!(
            stored
                .entry(candidate.id())
                .and_then(|entry| entry.response.as_deref()),
            Some("first")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn response_outcomes_distinguish_missing_rows(store: MemoryPromptStore) {
        let candidate = prompt(PromptOwner::Admin);
        let session =
            PromptSession::start(session_id(), owner("sub-1"), Utc::now(), &[candidate])
                .expect("valid session");
        SessionRepository::insert(&store, &session).await.expect("insert");

        let missing_entry = store
            .record_response(&owner("sub-1"), &session_id(), &PromptId::random(), "hi")
            .await
            .expect("write");
        let missing_session = store
            .record_response(&owner("sub-2"), &session_id(), &PromptId::random(), "hi")
            .await
            .expect("write");

        assert_eq!(missing_entry, ResponseWriteOutcome::EntryMissing);
        assert_eq!(missing_session, ResponseWriteOutcome::SessionMissing);
    }

    #[rstest]
    #[tokio::test]
    async fn sessions_are_scoped_by_owner(store: MemoryPromptStore) {
        for raw in ["sub-1", "sub-2"] {
            let session = PromptSession::start(session_id(), owner(raw), Utc::now(), &[])
                .expect("valid session");
            SessionRepository::insert(&store, &session).await.expect("insert");
        }
        let duplicate = PromptSession::start(session_id(), owner("sub-1"), Utc::now(), &[])
            .expect("valid session");
        let err = SessionRepository::insert(&store, &duplicate)
            .await
            .expect_err("duplicate");
        assert!(matches!(err, SessionRepositoryError::Duplicate { .. }));

        let mut owners = store.list_owners(&session_id()).await.expect("owners");
        owners.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        assert_eq!(owners, vec![owner("sub-1"), owner("sub-2")]);

        assert!(
            SessionRepository::delete(&store, &owner("sub-1"), &session_id())
                .await
                .expect("delete")
        );
        assert_eq!(
            store.list_owners(&session_id()).await.expect("owners"),
            vec![owner("sub-2")]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn users_are_created_once(store: MemoryPromptStore) {
        let user = User::new(owner("sub-1"), None);
        assert!(store.ensure(&user).await.expect("ensure"));
        assert!(!store.ensure(&user).await.expect("ensure"));
        assert_eq!(
            UserRepository::find_by_id(&store, &owner("sub-1"))
                .await
                .expect("find"),
            Some(user)
        );
    }
}
