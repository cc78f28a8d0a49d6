//! Builders wiring record store and identity adapters into HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use promptdeck::domain::ports::{
    IdentityProvider, IdentityVerifier, PromptRepository, SessionRepository, UserRepository,
};
use promptdeck::domain::{
    AccountService, PromptCatalogService, ReadRetryPolicy, SessionEngineService,
};
use promptdeck::inbound::http::state::HttpState;
use promptdeck::outbound::memory::MemoryPromptStore;
use promptdeck::outbound::persistence::{
    DbPool, DieselPromptRepository, DieselSessionRepository, DieselUserRepository,
};

/// Record store selected at startup.
#[derive(Clone)]
pub enum RecordStore {
    Postgres(DbPool),
    /// Process-local store used when no database URL is configured.
    Memory(Arc<MemoryPromptStore>),
}

impl RecordStore {
    /// Prompt repository view, used for seeding.
    pub fn prompts(&self) -> Arc<dyn PromptRepository> {
        match self {
            Self::Postgres(pool) => Arc::new(DieselPromptRepository::new(pool.clone())),
            Self::Memory(store) => store.clone(),
        }
    }
}

/// Build the handler dependency bundle over the chosen record store.
pub fn build_http_state<P, V>(
    store: &RecordStore,
    provider: Arc<P>,
    verifier: Arc<V>,
    retry: ReadRetryPolicy,
) -> HttpState
where
    P: IdentityProvider + 'static,
    V: IdentityVerifier + 'static,
{
    match store {
        RecordStore::Postgres(pool) => assemble(
            Arc::new(DieselPromptRepository::new(pool.clone())),
            Arc::new(DieselSessionRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            provider,
            verifier,
            retry,
        ),
        RecordStore::Memory(memory) => assemble(
            memory.clone(),
            memory.clone(),
            memory.clone(),
            provider,
            verifier,
            retry,
        ),
    }
}

fn assemble<R, S, U, P, V>(
    prompts: Arc<R>,
    sessions: Arc<S>,
    users: Arc<U>,
    provider: Arc<P>,
    verifier: Arc<V>,
    retry: ReadRetryPolicy,
) -> HttpState
where
    R: PromptRepository + 'static,
    S: SessionRepository + 'static,
    U: UserRepository + 'static,
    P: IdentityProvider + 'static,
    V: IdentityVerifier + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let catalog = Arc::new(
        PromptCatalogService::new(prompts, clock.clone()).with_retry_policy(retry.clone()),
    );
    let engine = Arc::new(
        SessionEngineService::new(sessions, catalog.clone(), clock).with_retry_policy(retry),
    );
    let accounts = Arc::new(AccountService::new(provider, verifier, users));
    HttpState::new(catalog, engine, accounts)
}
