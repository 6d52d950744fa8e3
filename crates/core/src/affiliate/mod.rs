//! Affiliate sign-up and approval records.
//!
//! # Modules
//!
//! - `types` - Registration, credential and sign-up input types
//! - `error` - Sign-up validation errors
//! - `validation` - Field rules for sign-up and UTM ids

pub mod error;
pub mod types;
pub mod validation;

pub use error::RegistrationError;
pub use types::{Credential, NewRegistration, Registration};
pub use validation::{is_valid_utm_id, normalize_username, validate_registration};
