//! Backend entry-point: loads configuration, prepares the database and
//! serves the `/api` routes, health probes and (in debug builds) Swagger UI.

mod server;

use std::ffi::OsString;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use site_backend::inbound::http::health::HealthState;
use site_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use site_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use site_backend::settings::{AdminSeedSettings, ServerSettings};

use server::{ServerConfig, create_server};

const BIN_NAME: &str = "site-backend";

/// Apply pending migrations and open the connection pool.
async fn connect_database(settings: &ServerSettings) -> color_eyre::Result<Option<DbPool>> {
    let Some(url) = settings.database_url() else {
        warn!("SITE_DATABASE_URL not set; falling back to in-memory stores");
        return Ok(None);
    };

    let migration_url = url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database migrations complete");

    let config = PoolConfig::new(url).with_max_size(settings.db_max_connections());
    let pool = DbPool::new(config)
        .await
        .wrap_err("failed to build database pool")?;
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter([OsString::from(BIN_NAME)])
        .map_err(|err| eyre!("failed to load server settings: {err}"))?;
    let admin_settings = AdminSeedSettings::load_from_iter([OsString::from(BIN_NAME)])
        .map_err(|err| eyre!("failed to load admin seed settings: {err}"))?;
    let cookies = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())?;

    let mut config = ServerConfig::new(cookies, settings.bind_addr()?)
        .with_admin_seed(admin_settings.account()?);
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let (server, sweeper) = create_server(health_state.clone(), config).await?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    sweeper.shutdown();
    outcome.wrap_err("server terminated with an error")
}
