//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the
//! authentication port, so tests can swap in a mock or in-memory stores.

use std::sync::Arc;

use crate::domain::ports::AuthenticationService;

use super::session_config::SessionCookiePolicy;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login and session use-cases.
    pub auth: Arc<dyn AuthenticationService>,
    /// Attributes for issued and cleared session cookies.
    pub cookies: SessionCookiePolicy,
}

impl HttpState {
    /// Bundle the authentication port with the cookie policy.
    pub fn new(auth: Arc<dyn AuthenticationService>, cookies: SessionCookiePolicy) -> Self {
        Self { auth, cookies }
    }
}
