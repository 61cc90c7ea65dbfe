//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::AuthenticationService;
use crate::domain::{FullName, PasswordHash, PublicUser, Role, User, UserId, Username};

use super::session_config::{SESSION_COOKIE_NAME, SessionCookiePolicy};
use super::state::HttpState;

/// Public projection of a freshly minted account.
pub fn public_user(username: &str, role: Role) -> PublicUser {
    User::new(
        UserId::random(),
        Username::new(username).expect("fixture username"),
        PasswordHash::from_stored("unused"),
        role,
        FullName::new("Fixture User").expect("fixture full name"),
    )
    .to_public()
}

/// App with the `/api` routes backed by `auth` and insecure test cookies.
pub fn api_app(
    auth: Arc<dyn AuthenticationService>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(auth, SessionCookiePolicy::default());
    App::new()
        .app_data(web::Data::new(state.clone()))
        .configure(|cfg| super::configure(cfg, &state))
}

/// Find the `session` cookie set on a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}
