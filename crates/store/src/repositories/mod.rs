//! Repository abstractions for spreadsheet tabs.
//!
//! Each repository owns one tab and hides the row layout from the rest of the
//! application. Every call re-reads the tab; nothing is cached.

pub mod bank_details;
pub mod credential;
pub mod lead_report;
pub mod registration;
pub mod utm_summary;
pub mod withdrawal;

pub use bank_details::BankDetailsRepository;
pub use credential::CredentialRepository;
pub use lead_report::LeadReportRepository;
pub use registration::RegistrationRepository;
pub use utm_summary::UtmSummaryRepository;
pub use withdrawal::WithdrawalRepository;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::sheet::{Row, SheetError, TabularStore, cell, is_blank, row_of};

/// A managed tab: header row at index 0, records below it.
#[derive(Clone)]
pub(crate) struct Tab {
    store: Arc<dyn TabularStore>,
    name: String,
    headers: &'static [&'static str],
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("name", &self.name)
            .field("backend", &self.store.backend_tag())
            .finish()
    }
}

impl Tab {
    pub(crate) fn new(
        store: Arc<dyn TabularStore>,
        name: impl Into<String>,
        headers: &'static [&'static str],
    ) -> Self {
        Self {
            store,
            name: name.into(),
            headers,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Non-blank rows below the header, with their absolute row index.
    pub(crate) async fn records(&self) -> Result<Vec<(usize, Row)>, SheetError> {
        let rows = self.store.read_rows(&self.name).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| !is_blank(row))
            .collect())
    }

    /// Appends one record, writing the header first if the tab is empty.
    pub(crate) async fn append(&self, row: Row) -> Result<(), SheetError> {
        let existing = self.store.read_rows(&self.name).await?;
        let mut rows = Vec::with_capacity(2);
        if existing.iter().all(|r| is_blank(r)) {
            rows.push(row_of(self.headers));
        }
        rows.push(row);
        self.store.append_rows(&self.name, rows).await
    }

    pub(crate) async fn update(&self, index: usize, row: Row) -> Result<(), SheetError> {
        self.store.update_row(&self.name, index, row).await
    }

    /// Deletes every record matching `pred` and returns how many went.
    ///
    /// Rows are removed bottom-up so earlier indexes stay valid.
    pub(crate) async fn delete_where<F>(&self, pred: F) -> Result<usize, SheetError>
    where
        F: Fn(&[String]) -> bool,
    {
        let doomed: Vec<usize> = self
            .records()
            .await?
            .into_iter()
            .filter(|(_, row)| pred(row))
            .map(|(index, _)| index)
            .collect();

        for index in doomed.iter().rev() {
            self.store.delete_row(&self.name, *index).await?;
        }
        Ok(doomed.len())
    }
}

/// Case-insensitive comparison of a key cell.
pub(crate) fn key_matches(row: &[String], col: usize, key: &str) -> bool {
    cell(row, col).eq_ignore_ascii_case(key.trim())
}

/// Owned, trimmed cell; `None` when empty.
pub(crate) fn optional_cell(row: &[String], col: usize) -> Option<String> {
    let value = cell(row, col);
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses a money cell, tolerating thousands separators.
pub(crate) fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(&value.trim().replace(',', "")).ok()
}

pub(crate) fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

pub(crate) fn format_time(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(String::new, |t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemorySheetStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const HEADERS: &[&str] = &["key", "value"];

    #[tokio::test]
    async fn test_append_writes_header_on_empty_tab() {
        let store = Arc::new(MemorySheetStore::new());
        let tab = Tab::new(store.clone(), "T", HEADERS);

        tab.append(row_of(&["a", "1"])).await.unwrap();
        tab.append(row_of(&["b", "2"])).await.unwrap();

        assert_eq!(
            store.snapshot("T").await,
            vec![row_of(HEADERS), row_of(&["a", "1"]), row_of(&["b", "2"])]
        );
    }

    #[tokio::test]
    async fn test_records_skip_header_and_blank_rows() {
        let store = Arc::new(MemorySheetStore::new());
        store
            .seed(
                "T",
                vec![row_of(HEADERS), row_of(&["", ""]), row_of(&["a", "1"])],
            )
            .await;
        let tab = Tab::new(store, "T", HEADERS);

        let records = tab.records().await.unwrap();
        assert_eq!(records, vec![(2, row_of(&["a", "1"]))]);
    }

    #[tokio::test]
    async fn test_delete_where_removes_all_matches() {
        let store = Arc::new(MemorySheetStore::new());
        store
            .seed(
                "T",
                vec![
                    row_of(HEADERS),
                    row_of(&["a", "1"]),
                    row_of(&["b", "2"]),
                    row_of(&["A", "3"]),
                ],
            )
            .await;
        let tab = Tab::new(store.clone(), "T", HEADERS);

        let removed = tab.delete_where(|row| key_matches(row, 0, "a")).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            store.snapshot("T").await,
            vec![row_of(HEADERS), row_of(&["b", "2"])]
        );
    }

    #[test]
    fn test_cell_parsers() {
        assert_eq!(parse_decimal("1,250.50"), Some(dec!(1250.50)));
        assert_eq!(parse_decimal("abc"), None);

        let t = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(format_time(Some(t)), "2024-03-01T10:30:00Z");
        assert_eq!(parse_time("2024-03-01T10:30:00Z"), Some(t));
        assert_eq!(parse_time("yesterday"), None);
        assert_eq!(format_time(None), "");

        assert_eq!(optional_cell(&row_of(&[" x "]), 0).as_deref(), Some("x"));
        assert_eq!(optional_cell(&row_of(&[" "]), 0), None);
    }
}
