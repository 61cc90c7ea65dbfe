//! Mapping of domain validation failures onto `400 invalid_request` bodies.
//!
//! Every failure carries `details: {field, code}` so clients can highlight
//! the offending input without parsing the message.

use serde_json::json;

use crate::domain::{
    Error, LoginValidationError, ProfileUpdateError, RegistrationValidationError,
    UserValidationError,
};

/// Machine-readable validation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    Empty,
    TooShort,
    TooLong,
    NoChanges,
    Invalid,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::Empty => "empty",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::NoChanges => "no_changes",
            Self::Invalid => "invalid",
        }
    }
}

fn field_error(message: impl Into<String>, field: &str, code: ValidationCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn user_validation_code(err: &UserValidationError) -> ValidationCode {
    match err {
        UserValidationError::EmptyId
        | UserValidationError::EmptyUsername
        | UserValidationError::EmptyFullName => ValidationCode::Empty,
        UserValidationError::UsernameTooShort { .. } => ValidationCode::TooShort,
        UserValidationError::UsernameTooLong { .. }
        | UserValidationError::FullNameTooLong { .. }
        | UserValidationError::BioTooLong { .. }
        | UserValidationError::ProfilePhotoTooLong { .. } => ValidationCode::TooLong,
        UserValidationError::InvalidId | UserValidationError::UnknownRole => {
            ValidationCode::Invalid
        }
    }
}

pub(crate) fn login_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyUsername => "username",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(err.to_string(), field, ValidationCode::Empty)
}

pub(crate) fn registration_error(err: RegistrationValidationError) -> Error {
    let code = match &err {
        RegistrationValidationError::MissingField { .. } => ValidationCode::MissingField,
        RegistrationValidationError::Username(source)
        | RegistrationValidationError::FullName(source) => user_validation_code(source),
        RegistrationValidationError::PasswordTooShort { .. } => ValidationCode::TooShort,
    };
    field_error(err.to_string(), err.field(), code)
}

pub(crate) fn profile_error(err: ProfileUpdateError) -> Error {
    match &err {
        ProfileUpdateError::NoChanges => Error::invalid_request(err.to_string())
            .with_details(json!({ "code": ValidationCode::NoChanges.as_str() })),
        ProfileUpdateError::Field { field, source } => {
            field_error(err.to_string(), field, user_validation_code(source))
        }
    }
}
