//! Session cookie policy derived from the environment.
//!
//! Cookies are always `HttpOnly` and scoped to `/`. They are marked `Secure`
//! when `APP_ENV=production` unless `SESSION_COOKIE_SECURE` says otherwise,
//! and default to `SameSite=Lax`. Debug builds tolerate malformed toggles
//! with a warning; release builds reject them.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, Expiration, SameSite};
use mockable::Env;
use tracing::warn;

use crate::domain::ports::AuthenticatedSession;
use crate::domain::{SESSION_TTL_DAYS, SessionToken};

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE_NAME: &str = "session";

const APP_ENV: &str = "APP_ENV";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to defaults and warn about malformed toggles.
    Debug,
    /// Release builds reject malformed toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use site_backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Attributes applied to every session cookie the server issues.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionCookiePolicy {
    /// Whether cookies are marked `Secure`.
    pub secure: bool,
    /// `SameSite` attribute for session cookies.
    pub same_site: SameSite,
}

impl Default for SessionCookiePolicy {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl SessionCookiePolicy {
    /// Cookie carrying a freshly issued token for the full session lifetime.
    #[must_use]
    pub fn session_cookie(&self, token: &SessionToken) -> Cookie<'static> {
        self.base(token.as_str().to_owned())
            .max_age(CookieDuration::days(SESSION_TTL_DAYS))
            .finish()
    }

    /// Cookie for an issued session, also carrying its absolute `Expires`
    /// instant for clients that ignore `Max-Age`.
    #[must_use]
    pub fn issued_cookie(&self, session: &AuthenticatedSession) -> Cookie<'static> {
        let mut cookie = self.session_cookie(&session.token);
        match OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp()) {
            Ok(at) => cookie.set_expires(Expiration::from(at)),
            Err(err) => warn!(error = %err, "session expiry out of cookie range"),
        }
        cookie
    }

    /// Cookie instructing the browser to discard the session token.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        self.base(String::new())
            .max_age(CookieDuration::ZERO)
            .finish()
    }

    fn base(&self, value: String) -> actix_web::cookie::CookieBuilder<'static> {
        Cookie::build(SESSION_COOKIE_NAME, value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Production deployments must not send session cookies over plain HTTP.
    #[error("SESSION_COOKIE_SECURE=0 is not allowed when APP_ENV=production")]
    InsecureProductionCookie,
    /// `SameSite=None` requires a secure cookie.
    #[error("SESSION_SAMESITE=None requires secure cookies")]
    InsecureSameSiteNone,
}

/// Build the session cookie policy from environment variables.
///
/// # Examples
///
/// ```rust
/// use site_backend::inbound::http::session_config::{
///     session_settings_from_env, BuildMode,
/// };
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "APP_ENV" => Some("production".to_owned()),
///     _ => None,
/// });
///
/// let policy = session_settings_from_env(&env, BuildMode::Release)?;
/// assert!(policy.secure);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`SessionConfigError`] for malformed or insecure toggles in
/// release builds.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionCookiePolicy, SessionConfigError> {
    let production = is_production(env);
    let secure = cookie_secure_from_env(env, mode, production)?;
    let same_site = same_site_from_env(env, mode, secure)?;
    Ok(SessionCookiePolicy { secure, same_site })
}

fn is_production<E: Env>(env: &E) -> bool {
    env.string(APP_ENV)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("production"))
}

fn cookie_secure_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    production: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(COOKIE_SECURE_ENV) else {
        return Ok(production);
    };
    let secure = match parse_bool(&value) {
        Some(flag) => flag,
        None => {
            let error = SessionConfigError::InvalidEnv {
                name: COOKIE_SECURE_ENV,
                value: value.clone(),
                expected: BOOL_EXPECTED,
            };
            return debug_warn_or_error(mode, production, error, || {
                warn!(value = %value, "invalid SESSION_COOKIE_SECURE; using APP_ENV default");
            });
        }
    };
    if production && !secure {
        return debug_warn_or_error(
            mode,
            false,
            SessionConfigError::InsecureProductionCookie,
            || warn!("session cookies are not Secure although APP_ENV=production"),
        );
    }
    Ok(secure)
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = env.string(SAMESITE_ENV) else {
        return Ok(SameSite::Lax);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if secure => Ok(SameSite::None),
        "none" => debug_warn_or_error(
            mode,
            SameSite::Lax,
            SessionConfigError::InsecureSameSiteNone,
            || warn!("SESSION_SAMESITE=None without secure cookies; using Lax"),
        ),
        _ => {
            let error = SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: value.clone(),
                expected: SAMESITE_EXPECTED,
            };
            debug_warn_or_error(mode, SameSite::Lax, error, || {
                warn!(value = %value, "invalid SESSION_SAMESITE; using Lax");
            })
        }
    }
}

fn debug_warn_or_error<T, F>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: F,
) -> Result<T, SessionConfigError>
where
    F: FnOnce(),
{
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
