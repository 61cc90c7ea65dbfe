//! In-process adapters for the credential and session store ports.
//!
//! Used when no database is configured and by the test suites. Both stores
//! keep their state behind a mutex, so uniqueness checks and inserts happen
//! atomically just as they do under a database constraint.

mod session_store;
mod user_repository;

pub use session_store::InMemorySessionStore;
pub use user_repository::InMemoryUserRepository;
