//! Affiliate record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sign-up form as submitted by a prospective affiliate.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistration {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Social profile link (channel, page, handle URL).
    #[serde(default)]
    pub social_link: String,
    /// Mobile number.
    pub mobile: String,
    /// Requested login name.
    pub username: String,
    /// Plaintext password, hashed before it is stored.
    pub password: String,
    /// UTM id the affiliate would like, if any.
    #[serde(default)]
    pub utm_id: Option<String>,
}

/// A pending registration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Social profile link.
    pub social_link: String,
    /// Mobile number.
    pub mobile: String,
    /// Normalized username.
    pub username: String,
    /// Argon2id hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Requested UTM id.
    pub utm_id: Option<String>,
    /// When the sign-up arrived. `None` for rows typed in by hand.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// An approved affiliate login row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    /// Normalized username.
    pub username: String,
    /// Argon2id hash, carried over from the registration.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Assigned UTM id.
    pub utm_id: String,
    /// Display name.
    pub name: String,
    /// When the admin approved the registration.
    pub approved_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Builds the credential for an approved registration.
    #[must_use]
    pub fn from_registration(
        registration: &Registration,
        utm_id: String,
        approved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            username: registration.username.clone(),
            password_hash: registration.password_hash.clone(),
            utm_id,
            name: registration.name.clone(),
            approved_at: Some(approved_at),
        }
    }
}
