//! Pending registrations tab.

use std::sync::Arc;

use leadboard_core::affiliate::Registration;

use super::{Tab, format_time, key_matches, optional_cell, parse_time};
use crate::schema::REGISTRATION_HEADERS;
use crate::sheet::{Row, SheetError, TabularStore, cell};

const NAME: usize = 0;
const EMAIL: usize = 1;
const SOCIAL_LINK: usize = 2;
const MOBILE: usize = 3;
const USERNAME: usize = 4;
const PASSWORD_HASH: usize = 5;
const UTM_ID: usize = 6;
const SUBMITTED_AT: usize = 7;

fn from_row(row: &[String]) -> Option<Registration> {
    let username = cell(row, USERNAME);
    if username.is_empty() {
        return None;
    }
    Some(Registration {
        name: cell(row, NAME).to_string(),
        email: cell(row, EMAIL).to_string(),
        social_link: cell(row, SOCIAL_LINK).to_string(),
        mobile: cell(row, MOBILE).to_string(),
        username: username.to_lowercase(),
        password_hash: cell(row, PASSWORD_HASH).to_string(),
        utm_id: optional_cell(row, UTM_ID),
        submitted_at: parse_time(cell(row, SUBMITTED_AT)),
    })
}

fn to_row(registration: &Registration) -> Row {
    vec![
        registration.name.clone(),
        registration.email.clone(),
        registration.social_link.clone(),
        registration.mobile.clone(),
        registration.username.clone(),
        registration.password_hash.clone(),
        registration.utm_id.clone().unwrap_or_default(),
        format_time(registration.submitted_at),
    ]
}

/// Registration repository.
#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    tab: Tab,
}

impl RegistrationRepository {
    /// Creates a repository over the named tab.
    #[must_use]
    pub fn new(store: Arc<dyn TabularStore>, tab: impl Into<String>) -> Self {
        Self {
            tab: Tab::new(store, tab, REGISTRATION_HEADERS),
        }
    }

    /// Lists pending registrations in sheet order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn list(&self) -> Result<Vec<Registration>, SheetError> {
        Ok(self
            .tab
            .records()
            .await?
            .iter()
            .filter_map(|(_, row)| from_row(row))
            .collect())
    }

    /// Finds a pending registration by username (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Registration>, SheetError> {
        Ok(self
            .tab
            .records()
            .await?
            .iter()
            .find(|(_, row)| key_matches(row, USERNAME, username))
            .and_then(|(_, row)| from_row(row)))
    }

    /// Appends a registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the append fails.
    pub async fn create(&self, registration: &Registration) -> Result<(), SheetError> {
        self.tab.append(to_row(registration)).await
    }

    /// Deletes every registration row for `username`. Returns true if any
    /// row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a read or delete fails.
    pub async fn delete_by_username(&self, username: &str) -> Result<bool, SheetError> {
        let removed = self
            .tab
            .delete_where(|row| key_matches(row, USERNAME, username))
            .await?;
        if removed > 1 {
            tracing::warn!(tab = self.tab.name(), username, removed, "Removed duplicate registration rows");
        }
        Ok(removed > 0)
    }
}
