//! UTM summary tab.
//!
//! The earnings column is always rewritten from count and rate; the value in
//! the sheet is never trusted on read.

use std::sync::Arc;

use leadboard_core::earnings::UtmSummary;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;

use super::{Tab, key_matches, parse_decimal};
use crate::schema::UTM_SUMMARY_HEADERS;
use crate::sheet::{Row, SheetError, TabularStore, cell};

const UTM_ID: usize = 0;
const LEAD_COUNT: usize = 1;
const RATE_PER_LEAD: usize = 2;

fn to_row(summary: &UtmSummary) -> Row {
    vec![
        summary.utm_id.clone(),
        summary.lead_count.to_string(),
        summary.rate_per_lead.to_string(),
        summary.earnings.to_string(),
    ]
}

/// UTM summary repository.
#[derive(Debug, Clone)]
pub struct UtmSummaryRepository {
    tab: Tab,
    default_rate: Decimal,
}

impl UtmSummaryRepository {
    /// Creates a repository over the named tab. Rows with an empty or
    /// unreadable rate use `default_rate`.
    #[must_use]
    pub fn new(store: Arc<dyn TabularStore>, tab: impl Into<String>, default_rate: Decimal) -> Self {
        Self {
            tab: Tab::new(store, tab, UTM_SUMMARY_HEADERS),
            default_rate,
        }
    }

    /// Rate applied when a UTM id has no explicit rate.
    #[must_use]
    pub const fn default_rate(&self) -> Decimal {
        self.default_rate
    }

    fn from_row(&self, row: &[String]) -> Option<UtmSummary> {
        let utm_id = cell(row, UTM_ID);
        if utm_id.is_empty() {
            return None;
        }
        let lead_count = parse_decimal(cell(row, LEAD_COUNT))
            .and_then(|d| d.trunc().to_u64())
            .unwrap_or(0);
        let rate = parse_decimal(cell(row, RATE_PER_LEAD)).unwrap_or(self.default_rate);
        match UtmSummary::new(utm_id, lead_count, rate) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(tab = self.tab.name(), utm_id, error = %e, "Skipping UTM summary row");
                None
            }
        }
    }

    /// Lists summary rows in sheet order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn list(&self) -> Result<Vec<UtmSummary>, SheetError> {
        Ok(self
            .tab
            .records()
            .await?
            .iter()
            .filter_map(|(_, row)| self.from_row(row))
            .collect())
    }

    /// Finds the row for a UTM id (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn find(&self, utm_id: &str) -> Result<Option<UtmSummary>, SheetError> {
        Ok(self
            .tab
            .records()
            .await?
            .iter()
            .find(|(_, row)| key_matches(row, UTM_ID, utm_id))
            .and_then(|(_, row)| self.from_row(row)))
    }

    /// Overwrites the row for `summary.utm_id`, appending one if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a read or write fails.
    pub async fn upsert(&self, summary: &UtmSummary) -> Result<(), SheetError> {
        let existing = self
            .tab
            .records()
            .await?
            .into_iter()
            .find(|(_, row)| key_matches(row, UTM_ID, &summary.utm_id));

        match existing {
            Some((index, _)) => self.tab.update(index, to_row(summary)).await,
            None => self.tab.append(to_row(summary)).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{MemorySheetStore, row_of};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let store = Arc::new(MemorySheetStore::new());
        let repo = UtmSummaryRepository::new(store.clone(), "UtmSummary", dec!(50));

        for (utm, leads, rate) in [("asha01", 3, dec!(50)), ("ravi01", 1, dec!(40)), ("ASHA01", 5, dec!(60))] {
            repo.upsert(&UtmSummary::new(utm, leads, rate).unwrap())
                .await
                .unwrap();
        }

        let rows = store.snapshot("UtmSummary").await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], row_of(&["ASHA01", "5", "60", "300"]));

        let found = repo.find("asha01").await.unwrap().unwrap();
        assert_eq!(found.earnings, dec!(300));
    }

    #[tokio::test]
    async fn test_read_recomputes_earnings_and_defaults_rate() {
        let store = Arc::new(MemorySheetStore::new());
        store
            .seed(
                "UtmSummary",
                vec![
                    row_of(UTM_SUMMARY_HEADERS),
                    row_of(&["asha01", "10", "", "9999"]),
                    row_of(&["ravi01", "4.0", "25", ""]),
                ],
            )
            .await;
        let repo = UtmSummaryRepository::new(store, "UtmSummary", dec!(50));

        let rows = repo.list().await.unwrap();
        assert_eq!(rows[0], UtmSummary::new("asha01", 10, dec!(50)).unwrap());
        assert_eq!(rows[0].earnings, dec!(500));
        assert_eq!(rows[1].lead_count, 4);
        assert_eq!(rows[1].earnings, dec!(100));
    }

    #[tokio::test]
    async fn test_out_of_range_row_is_skipped() {
        let store = Arc::new(MemorySheetStore::new());
        store
            .seed(
                "UtmSummary",
                vec![
                    row_of(UTM_SUMMARY_HEADERS),
                    row_of(&["huge", "18446744073709551615", "79228162514264337593543950335", ""]),
                    row_of(&["ravi01", "4", "25", ""]),
                ],
            )
            .await;
        let repo = UtmSummaryRepository::new(store, "UtmSummary", dec!(50));

        let rows = repo.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].utm_id, "ravi01");
        assert!(repo.find("huge").await.unwrap().is_none());
    }
}
