//! Registration, login and session endpoints.
//!
//! ```text
//! POST /api/auth/register    {"username":"jdoe","password":"secret1","fullName":"Jane Doe"}
//! POST /api/auth/user-login  {"username":"jdoe","password":"secret1"}
//! POST /api/auth/admin-login {"username":"devansh","password":"devansh123"}
//! GET  /api/auth/me
//! POST /api/auth/logout
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::AuthenticatedSession;
use crate::domain::{Error, LoginCredentials, PublicUser, RegistrationDraft};

use super::ApiResult;
use super::session::{SessionContext, presented_token};
use super::session_config::SessionCookiePolicy;
use super::state::HttpState;
use super::validation::{login_error, registration_error};

/// Body of `POST /api/auth/register`.
///
/// Missing fields deserialise as empty strings so validation can report
/// them with a field-specific message.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[schema(example = "jdoe")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "secret1", min_length = 6)]
    pub password: String,
    #[serde(default)]
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    /// Accepted in any JSON shape and discarded; new accounts are always
    /// `user`.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub role: Option<Value>,
}

impl From<RegisterRequest> for RegistrationDraft {
    fn from(value: RegisterRequest) -> Self {
        Self {
            username: value.username,
            password: Zeroizing::new(value.password),
            full_name: value.full_name,
            requested_role: value.role.filter(|role| !role.is_null()).map(|role| match role {
                Value::String(role) => role,
                other => other.to_string(),
            }),
        }
    }
}

/// Body of the login endpoints.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "jdoe")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "secret1")]
    pub password: String,
}

impl LoginRequest {
    fn into_credentials(self) -> Result<LoginCredentials, Error> {
        let password = Zeroizing::new(self.password);
        LoginCredentials::try_from_parts(&self.username, &password).map_err(login_error)
    }
}

/// Successful response carrying the caller's public projection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub success: bool,
    pub user: PublicUser,
}

impl UserEnvelope {
    fn new(user: PublicUser) -> Self {
        Self {
            success: true,
            user,
        }
    }
}

/// Successful response without a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessEnvelope {
    pub success: bool,
}

fn session_response(
    status: StatusCode,
    cookies: &SessionCookiePolicy,
    session: AuthenticatedSession,
) -> HttpResponse {
    HttpResponse::build(status)
        .cookie(cookies.issued_cookie(&session))
        .json(UserEnvelope::new(session.user))
}

/// Create a `user` account and log it in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and logged in", body = UserEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid registration", body = Error),
        (status = 409, description = "Username already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = RegistrationDraft::from(payload.into_inner())
        .sanitise()
        .map_err(registration_error)?;
    let session = state.auth.register(registration).await?;
    Ok(session_response(StatusCode::CREATED, &state.cookies, session))
}

/// Log in with any role.
#[utoipa::path(
    post,
    path = "/api/auth/user-login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid username or password", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "userLogin",
    security([])
)]
#[post("/auth/user-login")]
pub async fn user_login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = payload.into_inner().into_credentials()?;
    let session = state.auth.login(&credentials).await?;
    Ok(session_response(StatusCode::OK, &state.cookies, session))
}

/// Log in to the admin panel.
#[utoipa::path(
    post,
    path = "/api/auth/admin-login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid username or password", body = Error),
        (status = 403, description = "Account is not an administrator", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/auth/admin-login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = payload.into_inner().into_credentials()?;
    let session = state.auth.admin_login(&credentials).await?;
    Ok(session_response(StatusCode::OK, &state.cookies, session))
}

/// Return the logged-in user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Not logged in", body = Error),
        (status = 503, description = "Session store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(session: SessionContext) -> ApiResult<web::Json<UserEnvelope>> {
    let user = session.require_user()?.clone();
    Ok(web::Json(UserEnvelope::new(user)))
}

/// Destroy the current session.
///
/// The removal cookie is sent even when the store fails, so the browser
/// forgets the token either way.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = SuccessEnvelope,
            headers(("Set-Cookie" = String, description = "Expired session cookie"))),
        (status = 500, description = "Session could not be destroyed", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>, req: HttpRequest) -> HttpResponse {
    let removal = state.cookies.removal_cookie();
    let outcome = match presented_token(&req) {
        Some(token) => state.auth.logout(&token).await,
        None => Ok(()),
    };
    match outcome {
        Ok(()) => HttpResponse::Ok()
            .cookie(removal)
            .json(SuccessEnvelope { success: true }),
        Err(err) => {
            let mut response = err.error_response();
            if let Err(cookie_err) = response.add_cookie(&removal) {
                error!(error = %cookie_err, "failed to attach session removal cookie");
            }
            response
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
