//! In-memory session store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionRecord, TokenDigest};

/// Session store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<TokenDigest, SessionRecord>>,
}

impl InMemorySessionStore {
    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<TokenDigest, SessionRecord>>, SessionStoreError> {
        self.sessions
            .lock()
            .map_err(|_| SessionStoreError::query("session store lock poisoned"))
    }

    /// Number of stored sessions, expired ones included.
    ///
    /// # Errors
    /// Fails only if the store mutex was poisoned.
    pub fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no sessions.
    ///
    /// # Errors
    /// Fails only if the store mutex was poisoned.
    pub fn is_empty(&self) -> Result<bool, SessionStoreError> {
        Ok(self.lock()?.is_empty())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, digest: &TokenDigest) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self.lock()?.get(digest).cloned())
    }

    async fn set(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        self.lock()?.insert(record.digest().clone(), record.clone());
        Ok(())
    }

    async fn destroy(&self, digest: &TokenDigest) -> Result<(), SessionStoreError> {
        self.lock()?.remove(digest);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired_at(now));
        Ok(u64::try_from(before - sessions.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SessionToken, UserId};
    use chrono::Duration;

    fn record(expires_at: DateTime<Utc>) -> SessionRecord {
        SessionRecord::new(SessionToken::generate().digest(), UserId::random(), expires_at)
    }

    #[tokio::test]
    async fn set_get_destroy_cycle() {
        let store = InMemorySessionStore::default();
        let session = record(Utc::now() + Duration::days(30));
        store.set(&session).await.expect("set");
        assert_eq!(
            store.get(session.digest()).await.expect("get"),
            Some(session.clone())
        );

        store.destroy(session.digest()).await.expect("destroy");
        assert!(store.get(session.digest()).await.expect("get").is_none());
        store
            .destroy(session.digest())
            .await
            .expect("destroying twice succeeds");
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let store = InMemorySessionStore::default();
        let now = Utc::now();
        let live = record(now + Duration::hours(1));
        store.set(&record(now - Duration::hours(1))).await.expect("set");
        store.set(&record(now)).await.expect("set");
        store.set(&live).await.expect("set");

        let removed = store.purge_expired(now).await.expect("purge");
        assert_eq!(removed, 2);
        assert_eq!(store.len().expect("len"), 1);
        assert!(store.get(live.digest()).await.expect("get").is_some());
    }
}
