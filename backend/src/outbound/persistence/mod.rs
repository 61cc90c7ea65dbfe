//! PostgreSQL adapters for the credential and session stores.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and the table definitions (`schema.rs`)
//! stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use site_backend::outbound::persistence::{
//!     DbPool, DieselSessionStore, DieselUserRepository, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/site")).await?;
//! let users = DieselUserRepository::new(pool.clone(), Arc::new(DefaultClock));
//! let sessions = DieselSessionStore::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_session_store;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_session_store::DieselSessionStore;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
