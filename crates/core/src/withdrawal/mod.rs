//! Withdrawal requests and their approval workflow.
//!
//! # Modules
//!
//! - `types` - Request, status, decision and bank detail types
//! - `error` - Withdrawal-specific error types
//! - `service` - Status transitions and request validation

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WithdrawalError;
pub use service::WithdrawalService;
pub use types::{BankDetails, Decision, WithdrawalRequest, WithdrawalStatus};
