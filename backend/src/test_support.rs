//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Only compiled for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::UserRepository;
use crate::domain::{
    FullName, PasswordHasher, Role, SessionAuthenticator, User, UserId, Username,
};
use crate::outbound::memory::{InMemorySessionStore, InMemoryUserRepository};

/// Clock whose current instant is set by the test.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Authenticator wired to in-memory stores.
pub type InMemoryAuthenticator = SessionAuthenticator<InMemoryUserRepository, InMemorySessionStore>;

/// In-memory stores, a controllable clock and a fast hasher.
pub struct TestStores {
    /// Credential store.
    pub users: Arc<InMemoryUserRepository>,
    /// Session store.
    pub sessions: Arc<InMemorySessionStore>,
    /// Clock shared with the authenticator.
    pub clock: Arc<MutableClock>,
    /// Low-cost hasher; hashes it produces only verify with itself.
    pub hasher: PasswordHasher,
}

impl Default for TestStores {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStores {
    /// Fresh empty stores with the clock at the current instant.
    ///
    /// # Panics
    /// Panics if the reduced scrypt parameters are rejected.
    #[must_use]
    pub fn new() -> Self {
        let hasher = PasswordHasher::fast()
            .unwrap_or_else(|err| panic!("fast scrypt parameters rejected: {err}"));
        Self {
            users: Arc::new(InMemoryUserRepository::default()),
            sessions: Arc::new(InMemorySessionStore::default()),
            clock: Arc::new(MutableClock::new(Utc::now())),
            hasher,
        }
    }

    /// Authenticator sharing these stores and clock.
    #[must_use]
    pub fn authenticator(&self) -> InMemoryAuthenticator {
        SessionAuthenticator::new(
            Arc::clone(&self.users),
            Arc::clone(&self.sessions),
            self.hasher,
            self.clock.clone(),
        )
    }

    /// Store an account with the given password.
    ///
    /// # Panics
    /// Panics on invalid input or a store failure.
    pub async fn seed_user(&self, username: &str, password: &str, full_name: &str, role: Role) -> User {
        let hash = self
            .hasher
            .hash(password)
            .unwrap_or_else(|err| panic!("hashing seed password failed: {err}"));
        let user = User::new(
            UserId::random(),
            Username::new(username).unwrap_or_else(|err| panic!("invalid seed username: {err}")),
            hash,
            role,
            FullName::new(full_name).unwrap_or_else(|err| panic!("invalid seed name: {err}")),
        );
        self.users
            .insert(&user)
            .await
            .unwrap_or_else(|err| panic!("seeding user failed: {err}"));
        user
    }
}
