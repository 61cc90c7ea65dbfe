//! Session authentication service.
//!
//! Implements [`AuthenticationService`] on top of the credential store and
//! the session store ports. Credential mismatches never reveal whether the
//! account exists: absent users cost one dummy scrypt derivation and fail
//! with the same message as a wrong password.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AuthenticatedSession, AuthenticationService, SessionResolution, SessionStore,
    SessionStoreError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, PasswordHasher, ProfileUpdate, PublicUser, Registration, Role,
    SessionRecord, SessionToken, TokenDigest, User, UserId, Username, session_ttl,
};

/// Message shared by every credential mismatch.
pub const INVALID_CREDENTIALS: &str = "invalid username or password";
/// Message returned when a non-admin attempts an admin login.
pub const ADMIN_REQUIRED: &str = "admin access required";

/// Session authenticator implementing the authentication driving port.
pub struct SessionAuthenticator<U: ?Sized, S: ?Sized> {
    users: Arc<U>,
    sessions: Arc<S>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized, S: ?Sized> SessionAuthenticator<U, S> {
    /// Create a new authenticator over the given stores.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use site_backend::domain::{PasswordHasher, SessionAuthenticator};
    /// # use site_backend::outbound::memory::{InMemorySessionStore, InMemoryUserRepository};
    /// let authenticator = SessionAuthenticator::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(InMemorySessionStore::default()),
    ///     PasswordHasher::new().expect("standard parameters"),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = authenticator;
    /// ```
    pub fn new(
        users: Arc<U>,
        sessions: Arc<S>,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            clock,
        }
    }
}

impl<U, S> SessionAuthenticator<U, S>
where
    U: UserRepository + ?Sized,
    S: SessionStore + ?Sized,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                error!(%message, "user repository unavailable");
                Error::service_unavailable("user store unavailable")
            }
            UserPersistenceError::Query { message } => {
                error!(%message, "user repository query failed");
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateUsername { .. } => {
                Error::conflict("username already exists")
            }
        }
    }

    fn map_session_error(error: SessionStoreError) -> Error {
        match error {
            SessionStoreError::Connection { message } => {
                error!(%message, "session store unavailable");
                Error::service_unavailable("session store unavailable")
            }
            SessionStoreError::Query { message } => {
                error!(%message, "session store query failed");
                Error::internal(format!("session store error: {message}"))
            }
        }
    }

    /// Lookup by the raw login name. Names that could never have been
    /// registered are treated as absent accounts.
    async fn find_account(&self, raw_username: &str) -> Result<Option<User>, Error> {
        let Ok(username) = Username::new(raw_username) else {
            return Ok(None);
        };
        self.users
            .find_by_username(&username)
            .await
            .map_err(Self::map_user_error)
    }

    async fn password_matches(
        &self,
        user: &User,
        credentials: &LoginCredentials,
    ) -> Result<bool, Error> {
        self.hasher
            .verify_blocking(credentials.password_secret(), user.password_hash().clone())
            .await
    }

    async fn reject_absent_account(&self, credentials: &LoginCredentials) -> Error {
        if let Err(err) = self.hasher.burn_blocking(credentials.password_secret()).await {
            return err;
        }
        Error::unauthorized(INVALID_CREDENTIALS)
    }

    async fn issue_session(&self, user: &User) -> Result<AuthenticatedSession, Error> {
        let token = SessionToken::generate();
        let expires_at = self.clock.utc() + session_ttl();
        let record = SessionRecord::new(token.digest(), user.id().clone(), expires_at);
        self.sessions
            .set(&record)
            .await
            .map_err(Self::map_session_error)?;
        info!(user_id = %user.id(), role = %user.role(), "session issued");
        Ok(AuthenticatedSession {
            token,
            user: user.to_public(),
            expires_at,
        })
    }

    async fn discard_session(&self, digest: &TokenDigest, reason: &'static str) {
        if let Err(err) = self.sessions.destroy(digest).await {
            warn!(error = %err, reason, "failed to discard stale session");
        }
    }
}

#[async_trait]
impl<U, S> AuthenticationService for SessionAuthenticator<U, S>
where
    U: UserRepository + ?Sized,
    S: SessionStore + ?Sized,
{
    async fn register(&self, registration: Registration) -> Result<AuthenticatedSession, Error> {
        let existing = self
            .users
            .find_by_username(registration.username())
            .await
            .map_err(Self::map_user_error)?;
        if existing.is_some() {
            return Err(Error::conflict("username already exists"));
        }

        let password_hash = self
            .hasher
            .hash_blocking(registration.password_secret())
            .await?;
        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            password_hash,
            registration.role(),
            registration.full_name().clone(),
        );
        self.users
            .insert(&user)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %user.id(), username = %user.username(), "user registered");

        self.issue_session(&user).await
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error> {
        let Some(user) = self.find_account(credentials.username()).await? else {
            return Err(self.reject_absent_account(credentials).await);
        };
        if !self.password_matches(&user, credentials).await? {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.issue_session(&user).await
    }

    async fn admin_login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, Error> {
        let Some(user) = self.find_account(credentials.username()).await? else {
            return Err(self.reject_absent_account(credentials).await);
        };
        if user.role() != Role::Admin {
            warn!(user_id = %user.id(), "admin login attempted by non-admin account");
            return Err(Error::forbidden(ADMIN_REQUIRED));
        }
        if !self.password_matches(&user, credentials).await? {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.issue_session(&user).await
    }

    async fn resolve(&self, token: &SessionToken) -> Result<SessionResolution, Error> {
        let digest = token.digest();
        let Some(record) = self
            .sessions
            .get(&digest)
            .await
            .map_err(Self::map_session_error)?
        else {
            return Ok(SessionResolution::Stale);
        };

        if record.is_expired_at(self.clock.utc()) {
            self.discard_session(&digest, "expired").await;
            return Ok(SessionResolution::Stale);
        }

        let user = self
            .users
            .find_by_id(record.user_id())
            .await
            .map_err(Self::map_user_error)?;
        match user {
            Some(user) => Ok(SessionResolution::Active(user.to_public())),
            None => {
                self.discard_session(&digest, "user missing").await;
                Ok(SessionResolution::Stale)
            }
        }
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), Error> {
        // Connection loss included: every destroy failure is a 500.
        self.sessions
            .destroy(&token.digest())
            .await
            .map_err(|err| {
                error!(error = %err, "failed to destroy session on logout");
                Error::internal("failed to destroy session")
            })
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<PublicUser, Error> {
        let updated = self
            .users
            .update_profile(user_id, update)
            .await
            .map_err(Self::map_user_error)?;
        match updated {
            Some(user) => {
                info!(user_id = %user.id(), "profile updated");
                Ok(user.to_public())
            }
            None => Err(Error::not_found("user not found")),
        }
    }
}

#[cfg(test)]
#[path = "session_authenticator_tests.rs"]
mod tests;
