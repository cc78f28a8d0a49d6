//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and a `bb8` connection pool.
//!
//! - Repository implementations only translate between Diesel rows and
//!   domain types.
//! - Row structs (`models.rs`) and the schema (`schema.rs`) stay private to
//!   this module.
//! - Every database failure is mapped to the owning port's error type.
//!
//! # Example
//!
//! ```ignore
//! use promptdeck::outbound::persistence::{DbPool, DieselPromptRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/prompts")).await?;
//! let repo = DieselPromptRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_prompt_repository;
mod diesel_session_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_prompt_repository::DieselPromptRepository;
pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
