//! Spreadsheet-backed storage for Leadboard.
//!
//! This crate provides:
//! - The `TabularStore` abstraction with HTTP and in-memory backends
//! - Tab layouts and header bootstrap
//! - One repository per tab
//! - The `Workbook` workflows that mutate several tabs at once

pub mod repositories;
pub mod schema;
pub mod sheet;
pub mod workflows;

pub use schema::ensure_headers;
pub use sheet::{HttpSheetStore, MemorySheetStore, SheetError, TabularStore};
pub use workflows::Workbook;

use std::sync::Arc;
use std::time::Duration;

use leadboard_shared::config::{SheetsConfig, SheetsProvider};

/// Builds the store selected by configuration.
///
/// # Errors
///
/// Returns an error if the HTTP backend cannot be configured.
pub fn connect(config: &SheetsConfig) -> Result<Arc<dyn TabularStore>, SheetError> {
    match &config.provider {
        SheetsProvider::Http {
            base_url,
            spreadsheet_id,
            auth,
        } => {
            let store = HttpSheetStore::new(
                base_url,
                spreadsheet_id,
                auth,
                Duration::from_secs(config.request_timeout_secs),
            )?;
            Ok(Arc::new(store))
        }
        SheetsProvider::Memory => Ok(Arc::new(MemorySheetStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadboard_shared::config::SheetsAuth;

    #[test]
    fn test_connect_selects_backend() {
        let memory = connect(&SheetsConfig::default()).unwrap();
        assert_eq!(memory.backend_tag(), "memory");

        let http = connect(&SheetsConfig {
            provider: SheetsProvider::Http {
                base_url: "https://sheets.example.com/v4".into(),
                spreadsheet_id: "doc".into(),
                auth: SheetsAuth::Bearer { token: "t".into() },
            },
            ..SheetsConfig::default()
        })
        .unwrap();
        assert_eq!(http.backend_tag(), "http");
    }
}
