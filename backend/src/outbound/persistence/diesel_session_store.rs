//! PostgreSQL-backed `SessionStore` implementation using Diesel ORM.
//!
//! Sessions are keyed by token digest. Lookups do not filter on expiry; the
//! authenticator decides whether a record is still live, and
//! `purge_expired` removes stale rows in bulk.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionRecord, TokenDigest, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::SessionRow;
use super::pool::{DbPool, PoolError};
use super::schema::sessions;

/// Diesel-backed implementation of the session store port.
#[derive(Clone)]
pub struct DieselSessionStore {
    pool: DbPool,
}

impl DieselSessionStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SessionStoreError {
    map_basic_pool_error(error, |message| SessionStoreError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> SessionStoreError {
    map_basic_diesel_error(
        error,
        SessionStoreError::query,
        SessionStoreError::connection,
    )
}

fn row_to_record(row: SessionRow) -> SessionRecord {
    SessionRecord::new(
        TokenDigest::from_stored(row.token_digest),
        UserId::from_uuid(row.user_id),
        row.expires_at,
    )
}

#[async_trait]
impl SessionStore for DieselSessionStore {
    async fn get(&self, digest: &TokenDigest) -> Result<Option<SessionRecord>, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<SessionRow> = sessions::table
            .find(digest.as_str())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_record))
    }

    async fn set(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = SessionRow {
            token_digest: record.digest().as_str().to_owned(),
            user_id: *record.user_id().as_uuid(),
            expires_at: record.expires_at(),
        };

        diesel::insert_into(sessions::table)
            .values(&row)
            .on_conflict(sessions::token_digest)
            .do_update()
            .set((
                sessions::user_id.eq(excluded(sessions::user_id)),
                sessions::expires_at.eq(excluded(sessions::expires_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn destroy(&self, digest: &TokenDigest) -> Result<(), SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(sessions::table.find(digest.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(sessions::table)
            .filter(sessions::expires_at.le(now))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(deleted, cutoff = %now, "purged expired sessions");
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}
