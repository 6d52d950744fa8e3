//! Read-only access to the lead report tab.

use std::collections::BTreeMap;
use std::sync::Arc;

use leadboard_core::earnings::{LeadReportLayout, count_leads, lead_counts};
use tracing::warn;

use crate::sheet::{SheetError, TabularStore};

/// Lead report repository.
#[derive(Clone)]
pub struct LeadReportRepository {
    store: Arc<dyn TabularStore>,
    tab: String,
    layout: LeadReportLayout,
}

impl std::fmt::Debug for LeadReportRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadReportRepository")
            .field("tab", &self.tab)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl LeadReportRepository {
    /// Creates a repository over the named tab.
    #[must_use]
    pub fn new(store: Arc<dyn TabularStore>, tab: impl Into<String>, layout: LeadReportLayout) -> Self {
        Self {
            store,
            tab: tab.into(),
            layout,
        }
    }

    /// Counts the leads attributed to one UTM id.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn leads_for(&self, utm_id: &str) -> Result<u64, SheetError> {
        let rows = self.store.read_rows(&self.tab).await?;
        let tally = count_leads(&rows, &self.layout, utm_id);
        if tally.skipped_cells > 0 {
            warn!(
                tab = %self.tab,
                utm_id,
                skipped = tally.skipped_cells,
                "Skipped unreadable lead counts"
            );
        }
        Ok(tally.leads)
    }

    /// Counts leads for every UTM id in the report, keyed by lowercased id.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be read.
    pub async fn all_counts(&self) -> Result<BTreeMap<String, u64>, SheetError> {
        let rows = self.store.read_rows(&self.tab).await?;
        Ok(lead_counts(&rows, &self.layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{MemorySheetStore, row_of};

    async fn repo() -> LeadReportRepository {
        let store = Arc::new(MemorySheetStore::new());
        store
            .seed(
                "LeadReport",
                vec![
                    row_of(&["Leads by source"]),
                    row_of(&["utm_source", "COUNTA of lead"]),
                    row_of(&["asha01", "7"]),
                    row_of(&["ravi01", "n/a"]),
                    row_of(&["ASHA01", "2"]),
                    row_of(&["Grand Total", "9"]),
                    row_of(&["asha01", "100"]),
                ],
            )
            .await;
        LeadReportRepository::new(store, "LeadReport", LeadReportLayout::new("utm_source", "Grand Total"))
    }

    #[tokio::test]
    async fn test_leads_for() {
        let repo = repo().await;
        assert_eq!(repo.leads_for("asha01").await.unwrap(), 9);
        assert_eq!(repo.leads_for("ravi01").await.unwrap(), 0);
        assert_eq!(repo.leads_for("none").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_all_counts() {
        let counts = repo().await.all_counts().await.unwrap();
        assert_eq!(counts.get("asha01"), Some(&9));
        assert!(!counts.contains_key("ravi01"));
    }
}
