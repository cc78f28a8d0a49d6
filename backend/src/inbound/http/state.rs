//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, PromptCatalog, SessionEngine};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use promptdeck::domain::ports::{
///     FixtureIdentityProvider, FixtureIdentityVerifier, FixturePromptRepository,
///     FixtureSessionRepository, FixtureUserRepository,
/// };
/// use promptdeck::domain::{AccountService, PromptCatalogService, SessionEngineService};
/// use promptdeck::inbound::http::state::HttpState;
///
/// let catalog = Arc::new(PromptCatalogService::new(
///     Arc::new(FixturePromptRepository),
///     Arc::new(DefaultClock),
/// ));
/// let sessions = Arc::new(SessionEngineService::new(
///     Arc::new(FixtureSessionRepository),
///     catalog.clone(),
///     Arc::new(DefaultClock),
/// ));
/// let accounts = Arc::new(AccountService::new(
///     Arc::new(FixtureIdentityProvider),
///     Arc::new(FixtureIdentityVerifier),
///     Arc::new(FixtureUserRepository),
/// ));
/// let state = HttpState::new(catalog, sessions, accounts);
/// let _prompts = state.prompts.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub prompts: Arc<dyn PromptCatalog>,
    pub sessions: Arc<dyn SessionEngine>,
    pub accounts: Arc<dyn AccountCommand>,
}

impl HttpState {
    pub fn new(
        prompts: Arc<dyn PromptCatalog>,
        sessions: Arc<dyn SessionEngine>,
        accounts: Arc<dyn AccountCommand>,
    ) -> Self {
        Self {
            prompts,
            sessions,
            accounts,
        }
    }
}
