//! Lead aggregation and payout math.
//!
//! # Modules
//!
//! - `error` - Payout arithmetic failures
//! - `report` - Scanning the externally generated lead report
//! - `types` - UTM summary rows and affiliate earnings snapshots

pub mod error;
pub mod report;
pub mod types;

#[cfg(test)]
mod report_props;

pub use error::EarningsError;
pub use report::{LeadReportLayout, LeadTally, count_leads, lead_counts};
pub use types::{Balance, EarningsSnapshot, UtmSummary, earnings_for};
