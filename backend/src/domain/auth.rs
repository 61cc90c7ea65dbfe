//! Authentication primitives: login credentials and registration input.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use tracing::warn;
use zeroize::Zeroizing;

use super::user::{FullName, Role, UserValidationError, Username};

/// Minimum allowed password length at registration.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use site_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" jdoe ", "secret1").unwrap();
/// assert_eq!(creds.username(), "jdoe");
/// assert_eq!(creds.password(), "secret1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Owned copy of the password that is wiped on drop.
    #[must_use]
    pub fn password_secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

/// Validation failures for registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Username, password, or full name was missing or blank.
    MissingField { field: &'static str },
    /// Username failed validation.
    Username(UserValidationError),
    /// Full name failed validation.
    FullName(UserValidationError),
    /// Password is shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
}

impl RegistrationValidationError {
    /// Wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } => field,
            Self::Username(_) => "username",
            Self::FullName(_) => "fullName",
            Self::PasswordTooShort { .. } => "password",
        }
    }
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { .. } => {
                write!(f, "username, password, and full name are required")
            }
            Self::Username(err) | Self::FullName(err) => write!(f, "{err}"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Raw registration input as received from a client.
///
/// Clients may send a `role`; it is carried here only so that
/// [`RegistrationDraft::sanitise`] can discard it explicitly.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    /// Requested login name.
    pub username: String,
    /// Plaintext password, wiped on drop.
    pub password: Zeroizing<String>,
    /// Requested display name.
    pub full_name: String,
    /// Role requested by the client, always ignored.
    pub requested_role: Option<String>,
}

impl RegistrationDraft {
    /// Validate the draft and strip any client-requested privileges.
    ///
    /// The resulting [`Registration`] always carries [`Role::User`].
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::{RegistrationDraft, Role};
    /// use zeroize::Zeroizing;
    ///
    /// let registration = RegistrationDraft {
    ///     username: "jdoe".into(),
    ///     password: Zeroizing::new("secret1".into()),
    ///     full_name: "Jane Doe".into(),
    ///     requested_role: Some("admin".into()),
    /// }
    /// .sanitise()
    /// .expect("valid registration");
    /// assert_eq!(registration.role(), Role::User);
    /// ```
    pub fn sanitise(self) -> Result<Registration, RegistrationValidationError> {
        let Self {
            username,
            password,
            full_name,
            requested_role,
        } = self;

        for (field, value) in [
            ("username", username.as_str()),
            ("password", password.as_str()),
            ("fullName", full_name.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(RegistrationValidationError::MissingField { field });
            }
        }

        let username = Username::new(&username).map_err(RegistrationValidationError::Username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let full_name = FullName::new(&full_name).map_err(RegistrationValidationError::FullName)?;

        if let Some(role) = requested_role {
            warn!(username = %username, requested_role = %role, "ignoring client-supplied role on registration");
        }

        Ok(Registration {
            username,
            password,
            full_name,
            role: Role::User,
        })
    }
}

/// Sanitised registration ready to be persisted.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
    full_name: FullName,
    role: Role,
}

impl Registration {
    /// Validated login name.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Owned copy of the password that is wiped on drop.
    #[must_use]
    pub fn password_secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }

    /// Validated display name.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Role to persist; always [`Role::User`] for self-service sign-up.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}
