//! HTTP inbound adapter exposing the `/api` endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod profile;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
mod validation;

use actix_web::web;

pub use error::ApiResult;

use self::session::SessionResolver;
use self::state::HttpState;

/// Register the `/api` scope with session resolution and JSON error mapping.
///
/// The caller must also register `state` as `web::Data<HttpState>`.
///
/// # Examples
/// ```ignore
/// App::new()
///     .app_data(web::Data::new(state.clone()))
///     .configure(|cfg| site_backend::inbound::http::configure(cfg, &state));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig, state: &HttpState) {
    cfg.service(
        web::scope("/api")
            .wrap(SessionResolver::new(state.auth.clone(), state.cookies))
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .service(auth::register)
            .service(auth::user_login)
            .service(auth::admin_login)
            .service(auth::current_user)
            .service(auth::logout)
            .service(profile::update_profile),
    );
}
