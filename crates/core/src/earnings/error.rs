//! Earnings error types.

use leadboard_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from payout arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EarningsError {
    /// `leads * rate_per_lead` does not fit in a decimal.
    #[error("Earnings for {leads} leads at {rate_per_lead} per lead are out of range")]
    Overflow {
        /// Lead count.
        leads: u64,
        /// Payout per lead.
        rate_per_lead: Decimal,
    },

    /// Withdrawal totals do not fit in a decimal.
    #[error("Withdrawal totals are out of range")]
    BalanceOverflow,
}

impl From<EarningsError> for AppError {
    fn from(err: EarningsError) -> Self {
        Self::BusinessRule(err.to_string())
    }
}
