//! Port abstraction for server-side session storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{SessionRecord, TokenDigest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "session store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "session store query failed: {message}",
    }
}

/// Replaceable session store keyed by token digest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a session, including expired ones.
    async fn get(&self, digest: &TokenDigest) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Insert or replace a session.
    async fn set(&self, record: &SessionRecord) -> Result<(), SessionStoreError>;

    /// Remove a session. Removing an absent session succeeds.
    async fn destroy(&self, digest: &TokenDigest) -> Result<(), SessionStoreError>;

    /// Remove every session expired at `now`, returning how many were
    /// removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError>;
}
