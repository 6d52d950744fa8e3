//! Approved credentials tab.

use std::sync::Arc;

use leadboard_core::affiliate::Credential;

use super::{Tab, format_time, key_matches, parse_time};
use crate::schema::CREDENTIAL_HEADERS;
use crate::sheet::{Row, SheetError, TabularStore, cell};

const USERNAME: usize = 0;
const PASSWORD_HASH: usize = 1;
const UTM_ID: usize = 2;
const NAME: usize = 3;
const APPROVED_AT: usize = 4;

fn from_row(row: &[String]) -> Option<Credential> {
    let username = cell(row, USERNAME);
    if username.is_empty() {
        return None;
    }
    Some(Credential {
        username: username.to_lowercase(),
        password_hash: cell(row, PASSWORD_HASH).to_string(),
        utm_id: cell(row, UTM_ID).to_string(),
        name: cell(row, NAME).to_string(),
        approved_at: parse_time(cell(row, APPROVED_AT)),
    })
}

fn to_row(credential: &Credential) -> Row {
    vec![
        credential.username.clone(),
        credential.password_hash.clone(),
        credential.utm_id.clone(),
        credential.name.clone(),
        format_time(credential.approved_at),
    ]
}

/// Credential repository.
#[derive(Debug, Clone)]
pub struct CredentialRepository {
    tab: Tab,
}

impl CredentialRepository {
    /// Creates a repository over the named tab.
    #[must_use]
    pub fn new(store: Arc<dyn TabularStore>, tab: impl Into<String>) -> Self {
        Self {
            tab: Tab::new(store, tab, CREDENTIAL_HEADERS),
        }
    }

    /// Lists approved affiliates in sheet order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn list(&self) -> Result<Vec<Credential>, SheetError> {
        Ok(self
            .tab
            .records()
            .await?
            .iter()
            .filter_map(|(_, row)| from_row(row))
            .collect())
    }

    /// Finds a credential by username (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, SheetError> {
        self.find_by(USERNAME, username).await
    }

    /// Finds the credential holding a UTM id (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn find_by_utm(&self, utm_id: &str) -> Result<Option<Credential>, SheetError> {
        self.find_by(UTM_ID, utm_id).await
    }

    async fn find_by(&self, col: usize, key: &str) -> Result<Option<Credential>, SheetError> {
        Ok(self
            .tab
            .records()
            .await?
            .iter()
            .find(|(_, row)| key_matches(row, col, key))
            .and_then(|(_, row)| from_row(row)))
    }

    /// Appends a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the append fails.
    pub async fn create(&self, credential: &Credential) -> Result<(), SheetError> {
        self.tab.append(to_row(credential)).await
    }

    /// Deletes every credential row for `username`. Returns true if any row
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a read or delete fails.
    pub async fn delete_by_username(&self, username: &str) -> Result<bool, SheetError> {
        let removed = self
            .tab
            .delete_where(|row| key_matches(row, USERNAME, username))
            .await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemorySheetStore;
    use chrono::{TimeZone, Utc};

    fn credential(username: &str, utm: &str) -> Credential {
        Credential {
            username: username.into(),
            password_hash: "$argon2id$h".into(),
            utm_id: utm.into(),
            name: "Asha Rao".into(),
            approved_at: Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_lookup_by_username_and_utm() {
        let repo = CredentialRepository::new(Arc::new(MemorySheetStore::new()), "Credentials");
        repo.create(&credential("asha", "Asha01")).await.unwrap();
        repo.create(&credential("ravi", "ravi01")).await.unwrap();

        assert_eq!(
            repo.find_by_username("Asha").await.unwrap(),
            Some(credential("asha", "Asha01"))
        );
        assert_eq!(
            repo.find_by_utm("asha01").await.unwrap().map(|c| c.username),
            Some("asha".to_string())
        );
        assert!(repo.find_by_utm("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_keeps_other_rows() {
        let repo = CredentialRepository::new(Arc::new(MemorySheetStore::new()), "Credentials");
        repo.create(&credential("asha", "a1")).await.unwrap();
        repo.create(&credential("ravi", "r1")).await.unwrap();

        assert!(repo.delete_by_username("asha").await.unwrap());

        let left = repo.list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].username, "ravi");
    }
}
