//! HTTP server configuration object.

use std::net::SocketAddr;

use site_backend::domain::AdminAccount;
use site_backend::inbound::http::session_config::SessionCookiePolicy;
use site_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) cookies: SessionCookiePolicy,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) admin: Option<AdminAccount>,
}

impl ServerConfig {
    /// Construct a configuration without a database or admin seed.
    #[must_use]
    pub fn new(cookies: SessionCookiePolicy, bind_addr: SocketAddr) -> Self {
        Self {
            cookies,
            bind_addr,
            db_pool: None,
            admin: None,
        }
    }

    /// Persist users and sessions in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Create `admin` at startup when no account with its username exists.
    #[must_use]
    pub fn with_admin_seed(mut self, admin: Option<AdminAccount>) -> Self {
        self.admin = admin;
        self
    }
}
