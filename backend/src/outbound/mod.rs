//! Outbound adapters implementing the credential and session store ports.
//!
//! - **persistence**: PostgreSQL-backed stores using Diesel
//! - **memory**: mutex-guarded maps used by tests and database-less runs
//!
//! Adapters translate between domain types and storage representations and
//! contain no business logic.

pub mod memory;
pub mod persistence;
