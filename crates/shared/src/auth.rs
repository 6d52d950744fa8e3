//! Session claims and auth payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The configured administrator.
    Admin,
    /// An approved affiliate from the credentials tab.
    Affiliate,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Affiliate => "affiliate",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims for session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Session role.
    pub role: Role,
    /// UTM id assigned to the affiliate; absent for the admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        username: &str,
        role: Role,
        utm: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            role,
            utm,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the username from claims.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// Returns true for admin sessions.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Session info returned after login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    /// Username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Session role.
    pub role: Role,
    /// Assigned UTM id (affiliates only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_id: Option<String>,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Always true on success.
    pub success: bool,
    /// Human readable status.
    pub message: String,
    /// Authenticated user info.
    pub user: SessionUser,
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}
