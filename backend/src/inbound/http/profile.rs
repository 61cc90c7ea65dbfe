//! Profile endpoint for logged-in users.
//!
//! ```text
//! PATCH /api/user/profile {"fullName":"Jane Q. Doe","bio":"Tutor"}
//! ```

use actix_web::{patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, ProfileUpdate};

use super::ApiResult;
use super::auth::UserEnvelope;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::profile_error;

/// Body of `PATCH /api/user/profile`.
///
/// Unknown fields such as `role` or `username` are ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[schema(example = "Jane Q. Doe")]
    pub full_name: Option<String>,
    #[schema(example = "Maths tutor and occasional blogger.")]
    pub bio: Option<String>,
    #[schema(example = "/uploads/jdoe.png")]
    pub profile_photo: Option<String>,
}

impl TryFrom<ProfileUpdateRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: ProfileUpdateRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.full_name, value.bio, value.profile_photo)
            .map_err(profile_error)
    }
}

/// Update the caller's display name, biography or photo.
#[utoipa::path(
    patch,
    path = "/api/user/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserEnvelope),
        (status = 400, description = "Invalid update", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Account no longer exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[patch("/user/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let user_id = session.require_user()?.id().clone();
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state.auth.update_profile(&user_id, &update).await?;
    Ok(web::Json(UserEnvelope {
        success: true,
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::domain::ports::{MockAuthenticationService, SessionResolution};
    use crate::domain::{PublicUser, Role, SessionToken};
    use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
    use crate::inbound::http::test_utils::{api_app, public_user};

    async fn patch_profile(
        auth: MockAuthenticationService,
        body: Value,
        logged_in: bool,
    ) -> (StatusCode, Value) {
        let app = test::init_service(api_app(Arc::new(auth))).await;
        let mut req = test::TestRequest::patch()
            .uri("/api/user/profile")
            .set_json(body);
        if logged_in {
            let token = SessionToken::generate();
            req = req.cookie(Cookie::new(SESSION_COOKIE_NAME, token.as_str().to_owned()));
        }
        let res = test::call_service(&app, req.to_request()).await;
        (res.status(), test::read_body_json(res).await)
    }

    fn logged_in_as(auth: &mut MockAuthenticationService, username: &str) -> PublicUser {
        let user = public_user(username, Role::User);
        let resolved = user.clone();
        auth.expect_resolve()
            .return_once(move |_| Ok(SessionResolution::Active(resolved)));
        user
    }

    #[actix_web::test]
    async fn updates_the_callers_own_profile() {
        let mut auth = MockAuthenticationService::new();
        let caller = logged_in_as(&mut auth, "jdoe");
        let caller_id = caller.id().clone();
        auth.expect_update_profile()
            .withf(move |user_id, update| {
                *user_id == caller_id
                    && update.bio() == Some("Tutor")
                    && update.full_name().is_none()
            })
            .times(1)
            .return_once(move |_, _| Ok(caller));

        let (status, body) =
            patch_profile(auth, json!({"bio": "Tutor", "role": "admin"}), true).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "user");
    }

    #[actix_web::test]
    async fn anonymous_callers_are_rejected() {
        let mut auth = MockAuthenticationService::new();
        auth.expect_update_profile().never();

        let (status, _) = patch_profile(auth, json!({"bio": "Tutor"}), false).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn empty_updates_are_rejected() {
        let mut auth = MockAuthenticationService::new();
        logged_in_as(&mut auth, "jdoe");
        auth.expect_update_profile().never();

        let (status, body) = patch_profile(auth, json!({}), true).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["code"], "no_changes");
    }

    #[actix_web::test]
    async fn blank_full_name_is_rejected() {
        let mut auth = MockAuthenticationService::new();
        logged_in_as(&mut auth, "jdoe");
        auth.expect_update_profile().never();

        let (status, body) = patch_profile(auth, json!({"fullName": "   "}), true).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "fullName");
    }
}
