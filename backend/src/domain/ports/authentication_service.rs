//! Driving port for registration, login and session use-cases.
//!
//! Inbound adapters call it to authenticate callers without importing the
//! credential store or session store, so HTTP handler tests can substitute a
//! test double.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Error, LoginCredentials, ProfileUpdate, PublicUser, Registration, SessionToken, UserId,
};

/// A freshly issued session and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    /// Opaque token to hand to the client.
    pub token: SessionToken,
    /// Public projection of the session owner.
    pub user: PublicUser,
    /// Absolute expiry of the session.
    pub expires_at: DateTime<Utc>,
}

/// Outcome of resolving a presented session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResolution {
    /// The token maps to a live session of an existing user.
    Active(PublicUser),
    /// The token is unknown, expired, or belongs to a deleted user; the
    /// client should drop its cookie.
    Stale,
}

/// Domain use-case port for session authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthenticationService: Send + Sync {
    /// Create a `user` account and log it in.
    async fn register(&self, registration: Registration) -> Result<AuthenticatedSession, Error>;

    /// Verify credentials and issue a session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error>;

    /// Verify credentials of an admin account and issue a session.
    async fn admin_login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, Error>;

    /// Resolve a session token to its user.
    async fn resolve(&self, token: &SessionToken) -> Result<SessionResolution, Error>;

    /// Destroy the session referenced by the token.
    async fn logout(&self, token: &SessionToken) -> Result<(), Error>;

    /// Update the profile of an existing user.
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<PublicUser, Error>;
}
