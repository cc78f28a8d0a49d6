//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use mockable::DefaultClock;

use crate::domain::ports::{AccountCommand, FixtureIdentityProvider, FixtureIdentityVerifier};
use crate::domain::{AccountService, PromptCatalogService, SessionEngineService, seed_admin_prompts};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryPromptStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// HTTP state over an empty in-memory store with fixture identity adapters.
///
/// Bearer tokens are read as `sub` or `sub|email` by the fixture verifier.
pub fn memory_state() -> (HttpState, Arc<MemoryPromptStore>) {
    let store = Arc::new(MemoryPromptStore::default());
    let catalog = Arc::new(PromptCatalogService::new(
        store.clone(),
        Arc::new(DefaultClock),
    ));
    let sessions = Arc::new(SessionEngineService::new(
        store.clone(),
        catalog.clone(),
        Arc::new(DefaultClock),
    ));
    let accounts = Arc::new(AccountService::new(
        Arc::new(FixtureIdentityProvider),
        Arc::new(FixtureIdentityVerifier),
        store.clone(),
    ));
    (HttpState::new(catalog, sessions, accounts), store)
}

/// Same as [`memory_state`] with the built-in ADMIN prompts already stored.
pub async fn seeded_memory_state() -> (HttpState, Arc<MemoryPromptStore>) {
    let (state, store) = memory_state();
    seed_admin_prompts(store.as_ref(), &DefaultClock)
        .await
        .expect("seeding the in-memory store succeeds");
    (state, store)
}

/// Memory-backed state whose account port is replaced, e.g. by a mock.
pub fn state_with_accounts(accounts: Arc<dyn AccountCommand>) -> HttpState {
    let (state, _) = memory_state();
    HttpState {
        accounts,
        ..state
    }
}
