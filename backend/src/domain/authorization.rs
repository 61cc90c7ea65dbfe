//! Role gate for privileged operations.

use super::user::{PublicUser, Role};
use super::Error;

/// Identity attached to a request after session resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthContext {
    /// No valid session was presented.
    #[default]
    Anonymous,
    /// A live session resolved to this user.
    Authenticated(PublicUser),
}

impl AuthContext {
    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&PublicUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// Require any authenticated user.
    ///
    /// # Errors
    /// Returns an unauthorised [`Error`] for anonymous requests.
    pub fn require_user(&self) -> Result<&PublicUser, Error> {
        self.user()
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

/// Require that the request is authenticated with the given role.
///
/// Every admin-only operation calls this before doing any work.
///
/// # Errors
/// - Unauthorised when the context is anonymous.
/// - Forbidden when the user holds a different role.
///
/// # Examples
/// ```
/// use site_backend::domain::{require_role, AuthContext, ErrorCode, Role};
///
/// let err = require_role(&AuthContext::Anonymous, Role::Admin).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Unauthorized);
/// ```
pub fn require_role(ctx: &AuthContext, role: Role) -> Result<&PublicUser, Error> {
    let user = ctx.require_user()?;
    if user.role() != role {
        return Err(Error::forbidden(match role {
            Role::Admin => "admin access required",
            Role::User => "user access required",
        }));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, FullName, PasswordHash, User, UserId, Username};
    use rstest::rstest;

    fn context_for(role: Role) -> AuthContext {
        let user = User::new(
            UserId::random(),
            Username::new("devansh").expect("username"),
            PasswordHash::from_stored("unused"),
            role,
            FullName::new("Devansh").expect("full name"),
        );
        AuthContext::Authenticated(user.to_public())
    }

    #[rstest]
    fn anonymous_is_unauthorised() {
        let err = require_role(&AuthContext::Anonymous, Role::Admin).expect_err("anonymous");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn user_role_is_forbidden_from_admin_operations() {
        let ctx = context_for(Role::User);
        let err = require_role(&ctx, Role::Admin).expect_err("wrong role");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), "admin access required");
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::User)]
    fn matching_role_returns_user(#[case] role: Role) {
        let ctx = context_for(role);
        let user = require_role(&ctx, role).expect("matching role");
        assert_eq!(user.role(), role);
        assert_eq!(user.username().as_ref(), "devansh");
    }

    #[rstest]
    fn require_user_accepts_any_role() {
        assert!(context_for(Role::User).require_user().is_ok());
        assert!(AuthContext::default().require_user().is_err());
    }
}
