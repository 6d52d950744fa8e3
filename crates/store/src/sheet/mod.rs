//! Tabular store abstraction over a spreadsheet.
//!
//! Every tab is a grid of string cells addressed by 0-based row index. The
//! trait exposes the handful of range operations the repositories need:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     TabularStore                          │
//! ├──────────────────────────────────────────────────────────┤
//! │ read_rows(tab)            │ update_row(tab, i, row)      │
//! │ append_rows(tab, rows)    │ delete_row(tab, i)           │
//! ├──────────────────────────────────────────────────────────┤
//! │ HttpSheetStore (values API) │ MemorySheetStore (tests)   │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod http;
mod memory;
mod token;


pub use http::HttpSheetStore;
pub use memory::MemorySheetStore;

use async_trait::async_trait;
use leadboard_shared::AppError;
use thiserror::Error;

/// One spreadsheet row.
pub type Row = Vec<String>;

/// Errors from the spreadsheet service.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Transport failure (connect, timeout, TLS).
    #[error("spreadsheet request failed: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("spreadsheet service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Could not obtain an access token.
    #[error("spreadsheet authentication failed: {0}")]
    Auth(String),

    /// Response body did not have the expected shape.
    #[error("unexpected spreadsheet response: {0}")]
    Decode(String),

    /// No tab with this title exists.
    #[error("unknown tab: {0}")]
    UnknownTab(String),

    /// Row index past the end of the tab.
    #[error("row {index} is out of range for tab {tab}")]
    RowOutOfRange {
        /// Tab title.
        tab: String,
        /// Requested row index.
        index: usize,
    },
}

impl From<reqwest::Error> for SheetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<SheetError> for AppError {
    fn from(err: SheetError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// Range operations on a spreadsheet's tabs.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_tag(&self) -> &'static str;

    /// Returns every row of the tab, header included. Missing trailing cells
    /// are not padded.
    async fn read_rows(&self, tab: &str) -> Result<Vec<Row>, SheetError>;

    /// Appends rows after the last non-empty row.
    async fn append_rows(&self, tab: &str, rows: Vec<Row>) -> Result<(), SheetError>;

    /// Overwrites the row at `index`.
    async fn update_row(&self, tab: &str, index: usize, row: Row) -> Result<(), SheetError>;

    /// Removes the row at `index`; later rows shift up by one.
    async fn delete_row(&self, tab: &str, index: usize) -> Result<(), SheetError>;
}

/// Returns the cell at `col`, or `""` when the row is short.
#[must_use]
pub fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", |c| c.trim())
}

/// Returns true when every cell is empty or whitespace.
#[must_use]
pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Converts string slices into an owned row.
#[must_use]
pub fn row_of(cells: &[&str]) -> Row {
    cells.iter().map(|c| (*c).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_pads_short_rows() {
        let row = row_of(&["a", " b "]);
        assert_eq!(cell(&row, 0), "a");
        assert_eq!(cell(&row, 1), "b");
        assert_eq!(cell(&row, 5), "");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&[]));
        assert!(is_blank(&row_of(&["", "  "])));
        assert!(!is_blank(&row_of(&["", "x"])));
    }

    #[test]
    fn test_sheet_error_maps_to_external_service() {
        let err: AppError = SheetError::Status {
            status: 403,
            body: "PERMISSION_DENIED".into(),
        }
        .into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(
            err.details(),
            "spreadsheet service returned 403: PERMISSION_DENIED"
        );
    }
}
