//! Sign-up validation errors.

use leadboard_shared::AppError;
use thiserror::Error;

use crate::auth::PasswordError;

/// Errors raised while validating a registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Email is not of the form `local@domain.tld`.
    #[error("email address is invalid")]
    InvalidEmail,

    /// Mobile number has the wrong shape.
    #[error("mobile number must contain 10 to 15 digits")]
    InvalidMobile,

    /// Username uses characters outside `[a-z0-9._-]` or has the wrong length.
    #[error("username must be 3-32 characters of letters, digits, '.', '_' or '-'")]
    InvalidUsername,

    /// UTM id uses characters outside `[A-Za-z0-9_-]`.
    #[error("UTM id must be 1-64 characters of letters, digits, '_' or '-'")]
    InvalidUtmId,

    /// Password policy failure.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Password(
                PasswordError::HashError(_) | PasswordError::VerifyError(_) | PasswordError::InvalidHash,
            ) => Self::Internal(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
