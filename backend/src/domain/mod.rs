//! Domain primitives, services and ports.
//!
//! Purpose: define the account, credential and session types used by the
//! HTTP and persistence adapters, plus the session authenticator that ties
//! them together. Types are immutable once validated; each type documents
//! its invariants in Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User / PublicUser: stored account and its client-facing projection.
//! - PasswordHasher: salted scrypt hashing.
//! - SessionToken / SessionRecord: opaque cookie token and stored session.
//! - SessionAuthenticator: implementation of the authentication port.
//! - SessionSweeper: background purge of expired sessions.
//! - require_role: role gate for privileged operations.

pub mod admin_bootstrap;
pub mod auth;
pub mod authorization;
pub mod error;
pub mod password;
pub mod ports;
pub mod session;
pub mod session_authenticator;
pub mod session_sweeper;
pub mod trace_id;
pub mod user;

pub use self::admin_bootstrap::{AdminAccount, AdminBootstrap, AdminSeedOutcome};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration, RegistrationDraft,
    RegistrationValidationError,
};
pub use self::authorization::{AuthContext, require_role};
pub use self::error::{Error, ErrorCode};
pub use self::password::{PasswordHash, PasswordHashError, PasswordHasher};
pub use self::session::{
    SESSION_TTL_DAYS, SessionRecord, SessionToken, TokenDigest, session_ttl,
};
pub use self::session_authenticator::SessionAuthenticator;
pub use self::session_sweeper::{SWEEP_INTERVAL, SessionSweeper, SweeperHandle};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    FullName, ProfileUpdate, ProfileUpdateError, PublicUser, Role, User, UserId,
    UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use site_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
