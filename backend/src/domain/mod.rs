//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for prompts, sessions and users,
//! the ports that adapters implement, and the services behind the HTTP
//! surface. Invariants are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode : API error payload and stable error identifier.
//! - Prompt, Level, PromptOwner : catalog entities.
//! - PromptSession, SessionId, SessionPromptEntry : session entities.
//! - UserId, Email, User, VerifiedIdentity : identity entities.
//! - PromptCatalogService, SessionEngineService, AccountService : driving
//!   port implementations.

pub mod account_service;
pub mod error;
pub mod ports;
pub mod prompt;
pub mod prompt_catalog_service;
pub mod retry;
pub mod seed;
pub mod selection;
pub mod session;
pub mod session_engine_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::prompt::{
    Level, Prompt, PromptDraft, PromptId, PromptOwner, PromptText, PromptValidationError,
};
pub use self::prompt_catalog_service::PromptCatalogService;
pub use self::retry::{
    BackoffJitter, RandomJitter, ReadRetryPolicy, RetrySleeper, TokioSleeper, TransientError,
};
pub use self::seed::{SEED_PROMPTS, SeedOutcome, seed_admin_prompts};
pub use self::selection::{PromptSelector, SeededSelector, ThreadRngSelector};
pub use self::session::{
    PromptSession, PromptSessionDraft, SESSION_PROMPT_LIMIT, SessionId, SessionPromptEntry,
    SessionValidationError,
};
pub use self::session_engine_service::SessionEngineService;
pub use self::trace_id::TraceId;
pub use self::user::{ADMIN_OWNER, Email, User, UserId, UserValidationError, VerifiedIdentity};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use promptdeck::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
