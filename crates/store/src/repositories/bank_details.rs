//! Per-affiliate bank details tab.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadboard_core::withdrawal::BankDetails;

use super::{Tab, format_time, key_matches};
use crate::schema::BANK_DETAILS_HEADERS;
use crate::sheet::{Row, SheetError, TabularStore, cell};

const USERNAME: usize = 0;
const ACCOUNT_HOLDER: usize = 1;
const ACCOUNT_NUMBER: usize = 2;
const BANK_NAME: usize = 3;
const IFSC_CODE: usize = 4;

fn from_row(row: &[String]) -> BankDetails {
    BankDetails {
        account_holder: cell(row, ACCOUNT_HOLDER).to_string(),
        account_number: cell(row, ACCOUNT_NUMBER).to_string(),
        bank_name: cell(row, BANK_NAME).to_string(),
        ifsc_code: cell(row, IFSC_CODE).to_string(),
    }
}

fn to_row(username: &str, bank: &BankDetails, updated_at: DateTime<Utc>) -> Row {
    vec![
        username.to_string(),
        bank.account_holder.clone(),
        bank.account_number.clone(),
        bank.bank_name.clone(),
        bank.ifsc_code.clone(),
        format_time(Some(updated_at)),
    ]
}

/// Bank details repository.
#[derive(Debug, Clone)]
pub struct BankDetailsRepository {
    tab: Tab,
}

impl BankDetailsRepository {
    /// Creates a repository over the named tab.
    #[must_use]
    pub fn new(store: Arc<dyn TabularStore>, tab: impl Into<String>) -> Self {
        Self {
            tab: Tab::new(store, tab, BANK_DETAILS_HEADERS),
        }
    }

    /// Returns the stored bank details for `username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn find(&self, username: &str) -> Result<Option<BankDetails>, SheetError> {
        Ok(self
            .tab
            .records()
            .await?
            .iter()
            .find(|(_, row)| key_matches(row, USERNAME, username))
            .map(|(_, row)| from_row(row)))
    }

    /// Writes the bank details for `username`, replacing any existing row.
    ///
    /// # Errors
    ///
    /// Returns an error if a read or write fails.
    pub async fn upsert(&self, username: &str, bank: &BankDetails) -> Result<(), SheetError> {
        let row = to_row(username, bank, Utc::now());
        let existing = self
            .tab
            .records()
            .await?
            .into_iter()
            .find(|(_, row)| key_matches(row, USERNAME, username));

        match existing {
            Some((index, _)) => self.tab.update(index, row).await,
            None => self.tab.append(row).await,
        }
    }
}
