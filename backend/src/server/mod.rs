//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use site_backend::Trace;
#[cfg(debug_assertions)]
use site_backend::doc::ApiDoc;
use site_backend::domain::{Error, PasswordHasher, SweeperHandle};
use site_backend::inbound::http::configure;
use site_backend::inbound::http::health::{HealthState, live, ready};
use site_backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::{
    build_http_state, build_stores, purge_expired_sessions, seed_admin, session_sweeper,
};

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(web::Data::new(http_state.clone()))
        .wrap(Trace)
        .configure(|cfg| configure(cfg, &http_state))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

fn startup_error(error: Error) -> std::io::Error {
    std::io::Error::other(format!("startup failed: {error}"))
}

/// Prepare the stores and bind an Actix HTTP server.
///
/// Expired sessions are purged and the admin seed applied before the socket
/// is bound; the health state is marked ready once binding succeeds. The
/// returned [`SweeperHandle`] keeps purging expired sessions until it is
/// shut down.
///
/// # Errors
/// Propagates store failures during startup and [`std::io::Error`] when
/// binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<(Server, SweeperHandle)> {
    let ServerConfig {
        cookies,
        bind_addr,
        db_pool,
        admin,
    } = config;

    let hasher = PasswordHasher::new()
        .map_err(|err| std::io::Error::other(format!("invalid scrypt parameters: {err}")))?;
    let stores = build_stores(db_pool.as_ref());
    let sweeper = session_sweeper(&stores);
    purge_expired_sessions(&sweeper).await.map_err(startup_error)?;
    if let Some(outcome) = seed_admin(&stores, hasher, admin)
        .await
        .map_err(startup_error)?
    {
        info!(?outcome, "admin seed applied");
    }
    let http_state = build_http_state(&stores, hasher, cookies);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok((server, sweeper.spawn()))
}
