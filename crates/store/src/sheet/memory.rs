//! In-process tabs for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Row, SheetError, TabularStore};

/// Spreadsheet held in memory. Missing tabs read as empty and are created on
/// first write.
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    tabs: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemorySheetStore {
    /// Creates an empty spreadsheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents of a tab.
    pub async fn seed(&self, tab: &str, rows: Vec<Row>) {
        self.tabs.write().await.insert(tab.to_string(), rows);
    }

    /// Returns a copy of a tab's rows.
    pub async fn snapshot(&self, tab: &str) -> Vec<Row> {
        self.tabs.read().await.get(tab).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TabularStore for MemorySheetStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn read_rows(&self, tab: &str) -> Result<Vec<Row>, SheetError> {
        Ok(self.snapshot(tab).await)
    }

    async fn append_rows(&self, tab: &str, rows: Vec<Row>) -> Result<(), SheetError> {
        let mut tabs = self.tabs.write().await;
        let grid = tabs.entry(tab.to_string()).or_default();
        // Sheets appends after the last non-empty row.
        while grid.last().is_some_and(|row| super::is_blank(row)) {
            grid.pop();
        }
        grid.extend(rows);
        Ok(())
    }

    async fn update_row(&self, tab: &str, index: usize, row: Row) -> Result<(), SheetError> {
        let mut tabs = self.tabs.write().await;
        let slot = tabs
            .get_mut(tab)
            .and_then(|grid| grid.get_mut(index))
            .ok_or_else(|| SheetError::RowOutOfRange {
                tab: tab.to_string(),
                index,
            })?;
        *slot = row;
        Ok(())
    }

    async fn delete_row(&self, tab: &str, index: usize) -> Result<(), SheetError> {
        let mut tabs = self.tabs.write().await;
        match tabs.get_mut(tab) {
            Some(grid) if index < grid.len() => {
                grid.remove(index);
                Ok(())
            }
            _ => Err(SheetError::RowOutOfRange {
                tab: tab.to_string(),
                index,
            }),
        }
    }
}
