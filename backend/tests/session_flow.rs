//! End-to-end session flows over the HTTP adapter and in-memory stores.
//!
//! Each test assembles the `/api` scope the way the server does, backed by a
//! real `SessionAuthenticator`, so cookies issued by one request are honoured
//! by the next.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::TimeDelta;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use zeroize::Zeroizing;

use site_backend::Trace;
use site_backend::domain::{AdminAccount, AdminBootstrap, AdminSeedOutcome, Role, Username};
use site_backend::domain::ports::UserRepository;
use site_backend::inbound::http::configure;
use site_backend::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionCookiePolicy};
use site_backend::inbound::http::state::HttpState;
use site_backend::test_support::TestStores;

#[fixture]
fn stores() -> TestStores {
    TestStores::new()
}

async fn api(
    stores: &TestStores,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let state = HttpState::new(
        Arc::new(stores.authenticator()),
        SessionCookiePolicy::default(),
    );
    test::init_service(
        App::new()
            .wrap(Trace)
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| configure(cfg, &state)),
    )
    .await
}

fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}

async fn post(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    uri: &str,
    body: Value,
) -> ServiceResponse {
    test::call_service(app, test::TestRequest::post().uri(uri).set_json(body).to_request()).await
}

async fn me(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    cookie: Option<Cookie<'static>>,
) -> ServiceResponse {
    let mut req = test::TestRequest::get().uri("/api/auth/me");
    if let Some(cookie) = cookie {
        req = req.cookie(cookie);
    }
    test::call_service(app, req.to_request()).await
}

async fn seed_admin(stores: &TestStores, username: &str, password: &str) {
    let account = AdminAccount::try_new(
        username,
        Zeroizing::new(password.to_owned()),
        "Site Admin",
        None,
    )
    .expect("admin account");
    let outcome = AdminBootstrap::new(Arc::clone(&stores.users), stores.hasher)
        .ensure_admin(account)
        .await
        .expect("seed admin");
    assert_eq!(outcome, AdminSeedOutcome::Created);
}

#[rstest]
#[actix_web::test]
async fn registered_user_is_recognised_by_me(stores: TestStores) {
    let app = api(&stores).await;

    let res = post(
        &app,
        "/api/auth/register",
        json!({"username": "jdoe", "password": "secret1", "fullName": "Jane Doe"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(&res).expect("session cookie");

    let res = me(&app, Some(cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "jdoe");
    assert_eq!(body["user"]["fullName"], "Jane Doe");
    assert_eq!(body["user"]["role"], "user");
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_conflicts(stores: TestStores) {
    let app = api(&stores).await;
    let body = json!({"username": "jdoe", "password": "secret1", "fullName": "Jane Doe"});

    let first = post(&app, "/api/auth/register", body.clone()).await;
    let second = post(&app, "/api/auth/register", body).await;

    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert!(session_cookie(&second).is_none());
    let err: Value = test::read_body_json(second).await;
    assert_eq!(err["code"], "conflict");
    assert_eq!(stores.users.len().expect("user count"), 1);
}

#[rstest]
#[actix_web::test]
async fn concurrent_registrations_have_one_winner(stores: TestStores) {
    let app = api(&stores).await;
    let body = json!({"username": "jdoe", "password": "secret1", "fullName": "Jane Doe"});

    let (first, second) = futures_util::join!(
        post(&app, "/api/auth/register", body.clone()),
        post(&app, "/api/auth/register", body.clone()),
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort_by_key(StatusCode::as_u16);
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(stores.users.len().expect("user count"), 1);
}

#[rstest]
#[actix_web::test]
async fn registration_ignores_requested_role(stores: TestStores) {
    let app = api(&stores).await;

    let res = post(
        &app,
        "/api/auth/register",
        json!({
            "username": "mallory",
            "password": "secret1",
            "fullName": "Mallory",
            "role": "admin"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let username = Username::new("mallory").expect("username");
    let stored = stores
        .users
        .find_by_username(&username)
        .await
        .expect("lookup")
        .expect("stored user");
    assert_eq!(stored.role(), Role::User);
}

#[rstest]
#[actix_web::test]
async fn unknown_user_and_wrong_password_look_identical(stores: TestStores) {
    stores.seed_user("jdoe", "secret1", "Jane Doe", Role::User).await;
    let app = api(&stores).await;

    let unknown = post(
        &app,
        "/api/auth/user-login",
        json!({"username": "nobody", "password": "secret1"}),
    )
    .await;
    let wrong = post(
        &app,
        "/api/auth/user-login",
        json!({"username": "jdoe", "password": "wrong-password"}),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let unknown: Value = test::read_body_json(unknown).await;
    let wrong: Value = test::read_body_json(wrong).await;
    assert_eq!(unknown["code"], wrong["code"]);
    assert_eq!(unknown["message"], wrong["message"]);
    assert_eq!(unknown["message"], "invalid username or password");
}

#[rstest]
#[case::correct_password("devansh", "devansh123", StatusCode::OK)]
#[case::wrong_password("devansh", "not-the-password", StatusCode::UNAUTHORIZED)]
#[case::unknown_user("ghost", "devansh123", StatusCode::UNAUTHORIZED)]
#[case::non_admin("jdoe", "secret1", StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn admin_login_checks_role_and_password(
    stores: TestStores,
    #[case] username: &str,
    #[case] password: &str,
    #[case] expected: StatusCode,
) {
    seed_admin(&stores, "devansh", "devansh123").await;
    stores.seed_user("jdoe", "secret1", "Jane Doe", Role::User).await;
    let app = api(&stores).await;

    let res = post(
        &app,
        "/api/auth/admin-login",
        json!({"username": username, "password": password}),
    )
    .await;

    assert_eq!(res.status(), expected);
    assert_eq!(session_cookie(&res).is_some(), expected == StatusCode::OK);
    if expected == StatusCode::OK {
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["user"]["role"], "admin");
    }
}

#[rstest]
#[actix_web::test]
async fn logged_out_cookie_is_rejected(stores: TestStores) {
    stores.seed_user("jdoe", "secret1", "Jane Doe", Role::User).await;
    let app = api(&stores).await;

    let login = post(
        &app,
        "/api/auth/user-login",
        json!({"username": "jdoe", "password": "secret1"}),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = session_cookie(&login).expect("session cookie");

    let logout = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::OK);
    let removal = session_cookie(&logout).expect("removal cookie");
    assert_eq!(removal.value(), "");

    let res = me(&app, Some(cookie)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(stores.sessions.is_empty().expect("session count"));
}

#[rstest]
#[actix_web::test]
async fn expired_session_is_cleared(stores: TestStores) {
    stores.seed_user("jdoe", "secret1", "Jane Doe", Role::User).await;
    let app = api(&stores).await;

    let login = post(
        &app,
        "/api/auth/user-login",
        json!({"username": "jdoe", "password": "secret1"}),
    )
    .await;
    let cookie = session_cookie(&login).expect("session cookie");
    stores.clock.advance(TimeDelta::days(30) + TimeDelta::seconds(1));

    let res = me(&app, Some(cookie)).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let removal = session_cookie(&res).expect("removal cookie");
    assert_eq!(removal.value(), "");
    assert!(stores.sessions.is_empty().expect("session count"));
}

#[rstest]
#[actix_web::test]
async fn profile_update_is_visible_to_me(stores: TestStores) {
    let app = api(&stores).await;
    let res = post(
        &app,
        "/api/auth/register",
        json!({"username": "jdoe", "password": "secret1", "fullName": "Jane Doe"}),
    )
    .await;
    let cookie = session_cookie(&res).expect("session cookie");

    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri("/api/user/profile")
            .cookie(cookie.clone())
            .set_json(json!({"fullName": "Jane Q. Doe", "role": "admin"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = me(&app, Some(cookie)).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["fullName"], "Jane Q. Doe");
    assert_eq!(body["user"]["role"], "user");
}

#[rstest]
#[actix_web::test]
async fn anonymous_requests_are_unauthorised(stores: TestStores) {
    let app = api(&stores).await;

    let res = me(&app, None).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("trace-id"));
    assert!(session_cookie(&res).is_none());
}
