//! User data model.
//!
//! [`User`] is the stored account record and never leaves the domain in
//! serialised form. Adapters expose [`PublicUser`], the projection that
//! omits the password hash and profile extras.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::password::PasswordHash;

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 64;
/// Maximum allowed length for a full name.
pub const FULL_NAME_MAX: usize = 100;
/// Maximum allowed length for a biography.
pub const BIO_MAX: usize = 2000;
/// Maximum allowed length for a profile photo reference.
pub const PROFILE_PHOTO_MAX: usize = 2048;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    EmptyFullName,
    FullNameTooLong { max: usize },
    BioTooLong { max: usize },
    ProfilePhotoTooLong { max: usize },
    UnknownRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::FullNameTooLong { max } => {
                write!(f, "full name must be at most {max} characters")
            }
            Self::BioTooLong { max } => write!(f, "bio must be at most {max} characters"),
            Self::ProfilePhotoTooLong { max } => {
                write!(f, "profile photo reference must be at most {max} characters")
            }
            Self::UnknownRole => write!(f, "role must be either admin or user"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an existing UUID, typically one read back from storage.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Unique login name.
///
/// Surrounding whitespace is trimmed; comparison is exact and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::Username;
    ///
    /// let name = Username::new("  jdoe ").expect("valid username");
    /// assert_eq!(name.as_ref(), "jdoe");
    /// assert!(Username::new("jd").is_err());
    /// ```
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable name shown alongside authored content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a [`FullName`], trimming surrounding whitespace.
    pub fn new(full_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = full_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authorisation role attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Site administrator with access to the admin panel.
    Admin,
    /// Regular registered member.
    User,
}

impl Role {
    /// Storage and wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Stored account record.
///
/// ## Invariants
/// - `username` is unique across all accounts; the store enforces this.
/// - `password_hash` is never serialised or logged.
/// - `role` changes only through direct administrative action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: PasswordHash,
    role: Role,
    full_name: FullName,
    bio: Option<String>,
    profile_photo: Option<String>,
}

impl User {
    /// Build an account record without profile extras.
    #[must_use]
    pub fn new(
        id: UserId,
        username: Username,
        password_hash: PasswordHash,
        role: Role,
        full_name: FullName,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            role,
            full_name,
            bio: None,
            profile_photo: None,
        }
    }

    /// Attach a biography.
    #[must_use]
    pub fn with_bio(mut self, bio: Option<String>) -> Self {
        self.bio = bio;
        self
    }

    /// Attach a profile photo reference.
    #[must_use]
    pub fn with_profile_photo(mut self, profile_photo: Option<String>) -> Self {
        self.profile_photo = profile_photo;
        self
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Salted scrypt hash of the password.
    #[must_use]
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Authorisation role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Display name.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Optional biography.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    /// Optional profile photo reference.
    #[must_use]
    pub fn profile_photo(&self) -> Option<&str> {
        self.profile_photo.as_deref()
    }

    /// Project the record onto the fields safe to expose to clients.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
        }
    }
}

/// Client-facing projection of a [`User`]: `{id, username, fullName, role}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct PublicUser {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "jdoe")]
    username: Username,
    #[schema(value_type = String, example = "Jane Doe")]
    full_name: FullName,
    role: Role,
}

impl PublicUser {
    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Display name.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Authorisation role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Validated partial update of the caller's own profile.
///
/// At least one field is present. Identity fields (username, role,
/// password) cannot be expressed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    full_name: Option<FullName>,
    bio: Option<String>,
    profile_photo: Option<String>,
}

/// Validation errors raised by [`ProfileUpdate::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdateError {
    /// None of the updatable fields were supplied.
    NoChanges,
    /// A supplied field failed validation.
    Field {
        field: &'static str,
        source: UserValidationError,
    },
}

impl fmt::Display for ProfileUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChanges => write!(f, "at least one profile field must be provided"),
            Self::Field { source, .. } => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for ProfileUpdateError {}

impl ProfileUpdate {
    /// Validate the raw optional fields of a profile update.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::{ProfileUpdate, ProfileUpdateError};
    ///
    /// let update = ProfileUpdate::try_from_parts(None, Some("Hello".into()), None)
    ///     .expect("bio alone is a valid update");
    /// assert_eq!(update.bio(), Some("Hello"));
    /// assert_eq!(
    ///     ProfileUpdate::try_from_parts(None, None, None),
    ///     Err(ProfileUpdateError::NoChanges)
    /// );
    /// ```
    pub fn try_from_parts(
        full_name: Option<String>,
        bio: Option<String>,
        profile_photo: Option<String>,
    ) -> Result<Self, ProfileUpdateError> {
        if full_name.is_none() && bio.is_none() && profile_photo.is_none() {
            return Err(ProfileUpdateError::NoChanges);
        }

        let full_name = full_name
            .map(FullName::new)
            .transpose()
            .map_err(|source| ProfileUpdateError::Field {
                field: "fullName",
                source,
            })?;
        if let Some(value) = bio.as_deref() {
            ensure_max_len(value, BIO_MAX, "bio", |max| UserValidationError::BioTooLong { max })?;
        }
        if let Some(value) = profile_photo.as_deref() {
            ensure_max_len(value, PROFILE_PHOTO_MAX, "profilePhoto", |max| {
                UserValidationError::ProfilePhotoTooLong { max }
            })?;
        }

        Ok(Self {
            full_name,
            bio,
            profile_photo,
        })
    }

    /// Replacement display name, if any.
    #[must_use]
    pub fn full_name(&self) -> Option<&FullName> {
        self.full_name.as_ref()
    }

    /// Replacement biography, if any.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    /// Replacement profile photo reference, if any.
    #[must_use]
    pub fn profile_photo(&self) -> Option<&str> {
        self.profile_photo.as_deref()
    }

    /// Apply the update to an in-memory record.
    #[must_use]
    pub fn apply_to(&self, mut user: User) -> User {
        if let Some(name) = &self.full_name {
            user.full_name = name.clone();
        }
        if let Some(bio) = &self.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(photo) = &self.profile_photo {
            user.profile_photo = Some(photo.clone());
        }
        user
    }
}

fn ensure_max_len(
    value: &str,
    max: usize,
    field: &'static str,
    error: impl FnOnce(usize) -> UserValidationError,
) -> Result<(), ProfileUpdateError> {
    if value.chars().count() > max {
        return Err(ProfileUpdateError::Field {
            field,
            source: error(max),
        });
    }
    Ok(())
}
