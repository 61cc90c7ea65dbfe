//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod authentication_service;
mod session_store;
mod user_repository;

#[cfg(test)]
pub use authentication_service::MockAuthenticationService;
pub use authentication_service::{AuthenticatedSession, AuthenticationService, SessionResolution};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
