//! Handler tests for the authentication endpoints.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test;
use chrono::Utc;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockAuthenticationService, SessionResolution};
use crate::domain::{Role, SessionToken, session_ttl};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::test_utils::{api_app, public_user, session_cookie};

fn issued(user: PublicUser) -> AuthenticatedSession {
    AuthenticatedSession {
        token: SessionToken::generate(),
        user,
        expires_at: Utc::now() + session_ttl(),
    }
}

async fn post_json(auth: MockAuthenticationService, uri: &str, body: Value) -> ServiceResponse {
    let app = test::init_service(api_app(Arc::new(auth))).await;
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    test::call_service(&app, req).await
}

#[actix_web::test]
async fn register_creates_user_and_sets_cookie() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_register()
        .withf(|registration| {
            registration.username().to_string() == "jdoe" && registration.role() == Role::User
        })
        .times(1)
        .return_once(|_| Ok(issued(public_user("jdoe", Role::User))));

    let res = post_json(
        auth,
        "/api/auth/register",
        json!({"username": "jdoe", "password": "secret1", "fullName": "Jane Doe", "role": "admin"}),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(&res).expect("session cookie");
    assert_eq!(cookie.value().len(), 64);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age(), Some(CookieDuration::days(30)));
    assert!(cookie.expires_datetime().is_some());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "jdoe");
    assert_eq!(body["user"]["role"], "user");
    let keys: Vec<&str> = body["user"]
        .as_object()
        .expect("user object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 4);
    for key in ["id", "username", "fullName", "role"] {
        assert!(keys.contains(&key), "missing {key}");
    }
}

#[rstest]
#[case::missing_full_name(
    json!({"username": "jdoe", "password": "secret1"}),
    "username, password, and full name are required",
    "fullName"
)]
#[case::short_username(
    json!({"username": "jd", "password": "secret1", "fullName": "Jane Doe"}),
    "username must be at least 3 characters",
    "username"
)]
#[case::short_password(
    json!({"username": "jdoe", "password": "12345", "fullName": "Jane Doe"}),
    "password must be at least 6 characters",
    "password"
)]
#[actix_web::test]
async fn register_rejects_invalid_input(
    #[case] body: Value,
    #[case] message: &str,
    #[case] field: &str,
) {
    let mut auth = MockAuthenticationService::new();
    auth.expect_register().never();

    let res = post_json(auth, "/api/auth/register", body).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], message);
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[case::object(json!({"admin": true}))]
#[case::boolean(json!(true))]
#[case::number(json!(1))]
#[case::null(Value::Null)]
#[actix_web::test]
async fn register_discards_role_of_any_shape(#[case] role: Value) {
    let mut auth = MockAuthenticationService::new();
    auth.expect_register()
        .withf(|registration| registration.role() == Role::User)
        .times(1)
        .return_once(|_| Ok(issued(public_user("jdoe", Role::User))));

    let res = post_json(
        auth,
        "/api/auth/register",
        json!({"username": "jdoe", "password": "secret1", "fullName": "Jane Doe", "role": role}),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn register_reports_duplicates_as_conflict() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_register()
        .return_once(|_| Err(Error::conflict("username already exists")));

    let res = post_json(
        auth,
        "/api/auth/register",
        json!({"username": "jdoe", "password": "secret1", "fullName": "Jane Doe"}),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(session_cookie(&res).is_none());
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_login().never();
    let app = test::init_service(api_app(Arc::new(auth))).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/user-login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"username\":")
        .to_request();

    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn user_login_trims_username_and_sets_cookie() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_login()
        .withf(|credentials| credentials.username() == "jdoe")
        .return_once(|_| Ok(issued(public_user("jdoe", Role::User))));

    let res = post_json(
        auth,
        "/api/auth/user-login",
        json!({"username": "  jdoe ", "password": "secret1"}),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_some());
}

#[actix_web::test]
async fn user_login_rejects_blank_username() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_login().never();

    let res = post_json(
        auth,
        "/api/auth/user-login",
        json!({"username": "   ", "password": "secret1"}),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "username");
}

#[rstest]
#[case(
    "/api/auth/user-login",
    Error::unauthorized("invalid username or password"),
    StatusCode::UNAUTHORIZED
)]
#[case(
    "/api/auth/admin-login",
    Error::forbidden("admin access required"),
    StatusCode::FORBIDDEN
)]
#[actix_web::test]
async fn login_failures_map_to_status(
    #[case] uri: &str,
    #[case] failure: Error,
    #[case] expected: StatusCode,
) {
    let message = failure.message().to_owned();
    let mut auth = MockAuthenticationService::new();
    let stored = failure.clone();
    auth.expect_login().return_once(move |_| Err(stored));
    auth.expect_admin_login().return_once(move |_| Err(failure));

    let res = post_json(auth, uri, json!({"username": "jdoe", "password": "secret1"})).await;

    assert_eq!(res.status(), expected);
    assert!(session_cookie(&res).is_none());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], message);
}

#[actix_web::test]
async fn me_requires_a_session() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_resolve().never();
    let app = test::init_service(api_app(Arc::new(auth))).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/auth/me").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn me_returns_the_resolved_user() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_resolve()
        .return_once(|_| Ok(SessionResolution::Active(public_user("jdoe", Role::User))));
    let app = test::init_service(api_app(Arc::new(auth))).await;
    let token = SessionToken::generate();

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(Cookie::new(SESSION_COOKIE_NAME, token.as_str().to_owned()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: UserEnvelope = test::read_body_json(res).await;
    assert!(body.success);
    assert_eq!(body.user.username().to_string(), "jdoe");
}

async fn logout_with(
    auth: MockAuthenticationService,
    token: Option<&SessionToken>,
) -> ServiceResponse {
    let app = test::init_service(api_app(Arc::new(auth))).await;
    let mut req = test::TestRequest::post().uri("/api/auth/logout");
    if let Some(token) = token {
        req = req.cookie(Cookie::new(SESSION_COOKIE_NAME, token.as_str().to_owned()));
    }
    test::call_service(&app, req.to_request()).await
}

#[actix_web::test]
async fn logout_destroys_the_presented_session() {
    let token = SessionToken::generate();
    let expected = token.digest();
    let mut auth = MockAuthenticationService::new();
    auth.expect_resolve()
        .return_once(|_| Ok(SessionResolution::Active(public_user("jdoe", Role::User))));
    auth.expect_logout()
        .withf(move |presented| presented.digest() == expected)
        .times(1)
        .return_once(|_| Ok(()));

    let res = logout_with(auth, Some(&token)).await;

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("removal cookie");
    assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"success": true}));
}

#[actix_web::test]
async fn logout_without_cookie_still_succeeds() {
    let mut auth = MockAuthenticationService::new();
    auth.expect_logout().never();

    let res = logout_with(auth, None).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_some());
}

#[actix_web::test]
async fn logout_failure_still_clears_the_cookie() {
    let token = SessionToken::generate();
    let mut auth = MockAuthenticationService::new();
    auth.expect_resolve()
        .return_once(|_| Ok(SessionResolution::Active(public_user("jdoe", Role::User))));
    auth.expect_logout()
        .return_once(|_| Err(Error::internal("failed to destroy session")));

    let res = logout_with(auth, Some(&token)).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let cookie = session_cookie(&res).expect("removal cookie");
    assert_eq!(cookie.value(), "");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Internal server error");
}
