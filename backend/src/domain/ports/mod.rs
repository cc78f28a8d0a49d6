//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, `IdentityVerifier`, `IdentityProvider`)
//! describe what the domain needs from adapters. Driving ports
//! (`PromptCatalog`, `SessionEngine`, `AccountCommand`) describe what the
//! inbound layer may ask of the domain.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod identity_provider;
mod identity_verifier;
mod prompt_catalog;
mod prompt_repository;
mod session_engine;
mod session_repository;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, LoginRequest, LoginResponse, RegisterRequest};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{
    AuthTokens, FixtureIdentityProvider, IdentityProvider, IdentityProviderError, SignUpRequest,
};
#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
pub use identity_verifier::{FixtureIdentityVerifier, IdentityVerifier, IdentityVerifierError};
#[cfg(test)]
pub use prompt_catalog::MockPromptCatalog;
pub use prompt_catalog::{
    CreatePromptRequest, CreatePromptResponse, DeletePromptRequest, ListPromptsRequest,
    PickPromptRequest, PromptCatalog, PromptPayload,
};
#[cfg(test)]
pub use prompt_repository::MockPromptRepository;
pub use prompt_repository::{FixturePromptRepository, PromptRepository, PromptRepositoryError};
#[cfg(test)]
pub use session_engine::MockSessionEngine;
pub use session_engine::{
    RecordResponseRequest, SessionEngine, SessionEntryPayload, SessionLookup,
    StartSessionRequest, StartSessionResponse,
};
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{
    FixtureSessionRepository, ResponseWriteOutcome, SessionRepository, SessionRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
