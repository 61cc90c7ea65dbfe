//! Builders for the store adapters and the HTTP state wired on top of them.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use site_backend::domain::ports::{AuthenticationService, SessionStore, UserRepository};
use site_backend::domain::{
    AdminAccount, AdminBootstrap, AdminSeedOutcome, Error, PasswordHasher, SessionAuthenticator,
    SessionSweeper,
};
use site_backend::inbound::http::session_config::SessionCookiePolicy;
use site_backend::inbound::http::state::HttpState;
use site_backend::outbound::memory::{InMemorySessionStore, InMemoryUserRepository};
use site_backend::outbound::persistence::{DbPool, DieselSessionStore, DieselUserRepository};

/// Credential and session store pair selected at startup.
#[derive(Clone)]
pub(crate) struct Stores {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) sessions: Arc<dyn SessionStore>,
}

/// Use PostgreSQL when a pool is available, otherwise in-memory maps.
pub(crate) fn build_stores(pool: Option<&DbPool>) -> Stores {
    match pool {
        Some(pool) => Stores {
            users: Arc::new(DieselUserRepository::new(pool.clone(), Arc::new(DefaultClock))),
            sessions: Arc::new(DieselSessionStore::new(pool.clone())),
        },
        None => {
            warn!("no database configured; users and sessions are lost on restart");
            Stores {
                users: Arc::new(InMemoryUserRepository::default()),
                sessions: Arc::new(InMemorySessionStore::default()),
            }
        }
    }
}

/// Sweeper over the selected session store using the wall clock.
pub(crate) fn session_sweeper(stores: &Stores) -> SessionSweeper<dyn SessionStore> {
    SessionSweeper::new(Arc::clone(&stores.sessions), Arc::new(DefaultClock))
}

/// Delete sessions that expired while the server was down.
pub(crate) async fn purge_expired_sessions(
    sweeper: &SessionSweeper<dyn SessionStore>,
) -> Result<u64, Error> {
    let purged = sweeper
        .sweep()
        .await
        .map_err(|err| Error::service_unavailable(format!("session purge failed: {err}")))?;
    info!(purged, "expired sessions purged");
    Ok(purged)
}

/// Create the configured admin account if it is missing.
pub(crate) async fn seed_admin(
    stores: &Stores,
    hasher: PasswordHasher,
    admin: Option<AdminAccount>,
) -> Result<Option<AdminSeedOutcome>, Error> {
    let Some(account) = admin else {
        info!(reason = "ADMIN_PASSWORD unset", "admin seeding skipped");
        return Ok(None);
    };
    let outcome = AdminBootstrap::new(Arc::clone(&stores.users), hasher)
        .ensure_admin(account)
        .await?;
    Ok(Some(outcome))
}

/// Wire the session authenticator into the HTTP state.
pub(crate) fn build_http_state(
    stores: &Stores,
    hasher: PasswordHasher,
    cookies: SessionCookiePolicy,
) -> HttpState {
    let auth: Arc<dyn AuthenticationService> = Arc::new(SessionAuthenticator::new(
        Arc::clone(&stores.users),
        Arc::clone(&stores.sessions),
        hasher,
        Arc::new(DefaultClock),
    ));
    HttpState::new(auth, cookies)
}
