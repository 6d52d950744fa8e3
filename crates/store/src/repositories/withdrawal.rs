//! Withdrawal requests tab.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadboard_core::withdrawal::{BankDetails, WithdrawalRequest, WithdrawalStatus};
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use super::{Tab, format_time, key_matches, parse_decimal, parse_time};
use crate::schema::WITHDRAWAL_HEADERS;
use crate::sheet::{Row, SheetError, TabularStore, cell};

const ID: usize = 0;
const USERNAME: usize = 1;
const AMOUNT: usize = 2;
const ACCOUNT_HOLDER: usize = 3;
const ACCOUNT_NUMBER: usize = 4;
const BANK_NAME: usize = 5;
const IFSC_CODE: usize = 6;
const STATUS: usize = 7;
const REQUESTED_AT: usize = 8;
const DECIDED_AT: usize = 9;

fn from_row(row: &[String]) -> Option<WithdrawalRequest> {
    let id = Uuid::parse_str(cell(row, ID)).ok()?;
    let amount = parse_decimal(cell(row, AMOUNT)).filter(|a| *a > Decimal::ZERO)?;
    let status = WithdrawalStatus::parse(cell(row, STATUS))?;

    Some(WithdrawalRequest {
        id,
        username: cell(row, USERNAME).to_lowercase(),
        amount,
        bank: BankDetails {
            account_holder: cell(row, ACCOUNT_HOLDER).to_string(),
            account_number: cell(row, ACCOUNT_NUMBER).to_string(),
            bank_name: cell(row, BANK_NAME).to_string(),
            ifsc_code: cell(row, IFSC_CODE).to_string(),
        },
        status,
        // Rows without a timestamp sort first.
        requested_at: parse_time(cell(row, REQUESTED_AT)).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        decided_at: parse_time(cell(row, DECIDED_AT)),
    })
}

fn to_row(request: &WithdrawalRequest) -> Row {
    vec![
        request.id.to_string(),
        request.username.clone(),
        request.amount.to_string(),
        request.bank.account_holder.clone(),
        request.bank.account_number.clone(),
        request.bank.bank_name.clone(),
        request.bank.ifsc_code.clone(),
        request.status.as_str().to_string(),
        format_time(Some(request.requested_at)),
        format_time(request.decided_at),
    ]
}

/// Withdrawal repository.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    tab: Tab,
}

impl WithdrawalRepository {
    /// Creates a repository over the named tab.
    #[must_use]
    pub fn new(store: Arc<dyn TabularStore>, tab: impl Into<String>) -> Self {
        Self {
            tab: Tab::new(store, tab, WITHDRAWAL_HEADERS),
        }
    }

    async fn parsed(&self) -> Result<Vec<(usize, WithdrawalRequest)>, SheetError> {
        let records = self.tab.records().await?;
        let mut requests = Vec::with_capacity(records.len());
        for (index, row) in records {
            match from_row(&row) {
                Some(request) => requests.push((index, request)),
                None => warn!(tab = self.tab.name(), row = index + 1, "Skipping unreadable withdrawal row"),
            }
        }
        Ok(requests)
    }

    /// Lists every request in sheet order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn list(&self) -> Result<Vec<WithdrawalRequest>, SheetError> {
        Ok(self.parsed().await?.into_iter().map(|(_, r)| r).collect())
    }

    /// Lists one affiliate's requests in sheet order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn list_for_user(&self, username: &str) -> Result<Vec<WithdrawalRequest>, SheetError> {
        Ok(self
            .parsed()
            .await?
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| r.username.eq_ignore_ascii_case(username.trim()))
            .collect())
    }

    /// Finds a request by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn find(&self, id: Uuid) -> Result<Option<WithdrawalRequest>, SheetError> {
        Ok(self
            .parsed()
            .await?
            .into_iter()
            .find(|(_, r)| r.id == id)
            .map(|(_, r)| r))
    }

    /// Appends a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the append fails.
    pub async fn create(&self, request: &WithdrawalRequest) -> Result<(), SheetError> {
        self.tab.append(to_row(request)).await
    }

    /// Rewrites the status and decision time of a request. Returns the
    /// updated request, or `None` if no row has this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a read or write fails.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: WithdrawalStatus,
        decided_at: Option<DateTime<Utc>>,
    ) -> Result<Option<WithdrawalRequest>, SheetError> {
        let id_cell = id.to_string();
        let Some((index, row)) = self
            .tab
            .records()
            .await?
            .into_iter()
            .find(|(_, row)| key_matches(row, ID, &id_cell))
        else {
            return Ok(None);
        };
        let Some(mut request) = from_row(&row) else {
            return Ok(None);
        };

        request.status = status;
        request.decided_at = decided_at;
        self.tab.update(index, to_row(&request)).await?;
        Ok(Some(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{MemorySheetStore, row_of};
    use rust_decimal_macros::dec;

    fn request(username: &str, amount: Decimal) -> WithdrawalRequest {
        WithdrawalRequest {
            id: Uuid::new_v4(),
            username: username.into(),
            amount,
            bank: BankDetails {
                account_holder: "Asha Rao".into(),
                account_number: "123456789".into(),
                bank_name: "State Bank".into(),
                ifsc_code: "SBIN0001234".into(),
            },
            status: WithdrawalStatus::Pending,
            requested_at: DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            decided_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_for_user() {
        let repo = WithdrawalRepository::new(Arc::new(MemorySheetStore::new()), "Withdrawals");
        let first = request("asha", dec!(100));
        repo.create(&first).await.unwrap();
        repo.create(&request("ravi", dec!(50))).await.unwrap();

        assert_eq!(repo.list().await.unwrap().len(), 2);
        assert_eq!(repo.list_for_user("ASHA").await.unwrap(), vec![first.clone()]);
        assert_eq!(repo.find(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_set_status() {
        let repo = WithdrawalRepository::new(Arc::new(MemorySheetStore::new()), "Withdrawals");
        let pending = request("asha", dec!(100));
        repo.create(&pending).await.unwrap();

        let decided_at = pending.requested_at + chrono::Duration::hours(2);
        let updated = repo
            .set_status(pending.id, WithdrawalStatus::Rejected, Some(decided_at))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, WithdrawalStatus::Rejected);
        assert_eq!(repo.find(pending.id).await.unwrap(), Some(updated));
        assert!(
            repo.set_status(Uuid::new_v4(), WithdrawalStatus::Approved, None)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unreadable_rows_are_skipped() {
        let store = Arc::new(MemorySheetStore::new());
        store
            .seed(
                "Withdrawals",
                vec![
                    row_of(WITHDRAWAL_HEADERS),
                    row_of(&["not-a-uuid", "asha", "100"]),
                    row_of(&[
                        "6f1c9a52-3c1e-4c4b-9f5e-0d6c1b1c2a11",
                        "asha",
                        "1,000",
                        "Asha",
                        "123456",
                        "SBI",
                        "SBIN0001234",
                        "approved",
                    ]),
                ],
            )
            .await;
        let repo = WithdrawalRepository::new(store, "Withdrawals");

        let list = repo.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].amount, dec!(1000));
        assert_eq!(list[0].status, WithdrawalStatus::Approved);
        assert_eq!(list[0].requested_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_non_positive_amounts_are_skipped() {
        let store = Arc::new(MemorySheetStore::new());
        let row = |id: &str, amount: &str| {
            row_of(&[
                id,
                "asha",
                amount,
                "Asha",
                "123456",
                "SBI",
                "SBIN0001234",
                "approved",
            ])
        };
        store
            .seed(
                "Withdrawals",
                vec![
                    row_of(WITHDRAWAL_HEADERS),
                    row(
                        "0b5e2c1d-7a41-4f0e-8d2b-3c9a6e1f4b01",
                        "-39614081257132168796771975168",
                    ),
                    row("0b5e2c1d-7a41-4f0e-8d2b-3c9a6e1f4b02", "0"),
                    row("0b5e2c1d-7a41-4f0e-8d2b-3c9a6e1f4b03", "250"),
                ],
            )
            .await;
        let repo = WithdrawalRepository::new(store, "Withdrawals");

        let list = repo.list_for_user("asha").await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].amount, dec!(250));
    }
}
