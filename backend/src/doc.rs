//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler's `utoipa::path` annotation and adds
//! the `SessionCookie` security scheme. The document backs Swagger UI in
//! debug builds and is printed by `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, PublicUser, Role};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest, SuccessEnvelope, UserEnvelope};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::profile::ProfileUpdateRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Opaque session token issued by the register and login endpoints.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Site backend API",
        description = "Registration, login and session management for the site and its admin panel."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::user_login,
        crate::inbound::http::auth::admin_login,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::auth::logout,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        PublicUser,
        Role,
        RegisterRequest,
        LoginRequest,
        UserEnvelope,
        SuccessEnvelope,
        ProfileUpdateRequest,
        ProbeStatus,
    )),
    tags(
        (name = "auth", description = "Registration, login and logout"),
        (name = "users", description = "Operations on the logged-in user"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/auth/register")]
    #[case("/api/auth/user-login")]
    #[case("/api/auth/admin-login")]
    #[case("/api/auth/me")]
    #[case("/api/auth/logout")]
    #[case("/api/user/profile")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn public_user_schema_is_the_projection() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user = schemas.get("PublicUser").expect("PublicUser schema");

        for field in ["id", "username", "fullName", "role"] {
            assert_object_schema_has_field(user, field);
        }
    }

    #[test]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error, "code");
        assert_object_schema_has_field(error, "message");
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
