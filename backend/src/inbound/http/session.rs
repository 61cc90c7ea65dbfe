//! Session resolution for HTTP requests.
//!
//! [`SessionResolver`] runs before the `/api` handlers. It reads the
//! `session` cookie, asks the authentication port who the token belongs to
//! and stores the outcome in the request extensions, where the
//! [`SessionContext`] extractor picks it up. Stale tokens get a removal
//! cookie on the way out unless the handler already set a fresh one.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error};

use crate::domain::ports::{AuthenticationService, SessionResolution};
use crate::domain::{AuthContext, Error, PublicUser, Role, SessionToken, require_role};

use super::session_config::{SESSION_COOKIE_NAME, SessionCookiePolicy};

/// Outcome of session resolution stored in the request extensions.
#[derive(Debug, Clone)]
enum ResolvedSession {
    Ready(AuthContext),
    Failed(Error),
}

/// Token presented in the request's `session` cookie, if well-formed.
///
/// Malformed values are treated as absent.
pub fn presented_token(req: &HttpRequest) -> Option<SessionToken> {
    req.cookie(SESSION_COOKIE_NAME)
        .and_then(|cookie| SessionToken::parse(cookie.value()))
}

/// Middleware resolving the `session` cookie into an [`AuthContext`].
///
/// # Examples
/// ```ignore
/// use actix_web::web;
/// use site_backend::inbound::http::session::SessionResolver;
///
/// let scope = web::scope("/api").wrap(SessionResolver::new(auth, policy));
/// ```
#[derive(Clone)]
pub struct SessionResolver {
    auth: Arc<dyn AuthenticationService>,
    cookies: SessionCookiePolicy,
}

impl SessionResolver {
    /// Resolve sessions through `auth` and clear stale cookies per `cookies`.
    pub fn new(auth: Arc<dyn AuthenticationService>, cookies: SessionCookiePolicy) -> Self {
        Self { auth, cookies }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionResolver
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = SessionResolverMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionResolverMiddleware {
            service: Rc::new(service),
            auth: Arc::clone(&self.auth),
            cookies: self.cookies,
        }))
    }
}

/// Service wrapper produced by [`SessionResolver`].
pub struct SessionResolverMiddleware<S> {
    service: Rc<S>,
    auth: Arc<dyn AuthenticationService>,
    cookies: SessionCookiePolicy,
}

impl<S, B> Service<ServiceRequest> for SessionResolverMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth = Arc::clone(&self.auth);
        let cookies = self.cookies;

        Box::pin(async move {
            let presented = req.cookie(SESSION_COOKIE_NAME);
            let cookie_present = presented.is_some();
            let token = presented.and_then(|cookie| SessionToken::parse(cookie.value()));

            let (resolved, stale) = match token {
                None => (ResolvedSession::Ready(AuthContext::Anonymous), cookie_present),
                Some(token) => match auth.resolve(&token).await {
                    Ok(SessionResolution::Active(user)) => {
                        (ResolvedSession::Ready(AuthContext::Authenticated(user)), false)
                    }
                    Ok(SessionResolution::Stale) => {
                        (ResolvedSession::Ready(AuthContext::Anonymous), true)
                    }
                    Err(err) => (ResolvedSession::Failed(err), false),
                },
            };
            req.extensions_mut().insert(resolved);

            let mut res = service.call(req).await?;
            if stale && !sets_session_cookie(&res) {
                debug!("clearing stale session cookie");
                if let Err(err) = res.response_mut().add_cookie(&cookies.removal_cookie()) {
                    error!(error = %err, "failed to attach session removal cookie");
                }
            }
            Ok(res)
        })
    }
}

fn sets_session_cookie<B>(res: &ServiceResponse<B>) -> bool {
    res.response()
        .cookies()
        .any(|cookie| cookie.name() == SESSION_COOKIE_NAME)
}

/// Extractor exposing the caller's resolved session to handlers.
#[derive(Debug, Clone)]
pub struct SessionContext(AuthContext);

impl SessionContext {
    /// Require an authenticated caller or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<&PublicUser, Error> {
        self.0.require_user()
    }

    /// Require a caller holding `role`.
    pub fn require_role(&self, role: Role) -> Result<&PublicUser, Error> {
        require_role(&self.0, role)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<ResolvedSession>() {
            Some(ResolvedSession::Ready(ctx)) => Ok(Self(ctx.clone())),
            Some(ResolvedSession::Failed(err)) => Err(err.clone().into()),
            None => {
                error!("SessionContext extracted outside SessionResolver");
                Err(Error::internal("session resolution unavailable").into())
            }
        };
        ready(result)
    }
}
