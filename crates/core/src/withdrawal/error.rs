//! Withdrawal error types.

use leadboard_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::withdrawal::types::WithdrawalStatus;

/// Errors that can occur while requesting or deciding a withdrawal.
#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// Attempted to decide a request that is no longer pending.
    #[error("Cannot move withdrawal from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: WithdrawalStatus,
        /// The attempted target status.
        to: WithdrawalStatus,
    },

    /// Amount is zero or negative.
    #[error("Withdrawal amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount exceeds what the affiliate can still withdraw.
    #[error("Requested {requested} exceeds available balance {available}")]
    InsufficientBalance {
        /// Requested amount.
        requested: Decimal,
        /// Available balance.
        available: Decimal,
    },

    /// The affiliate already has a pending request.
    #[error("A withdrawal request is already pending")]
    PendingRequestExists,

    /// No bank details on file and none supplied.
    #[error("Bank details are required before requesting a withdrawal")]
    MissingBankDetails,

    /// A bank detail field is invalid.
    #[error("Invalid bank details: {0}")]
    InvalidBankDetails(&'static str),
}

impl WithdrawalError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount | Self::MissingBankDetails | Self::InvalidBankDetails(_) => {
                400
            }
            Self::PendingRequestExists => 409,
            Self::InvalidTransition { .. } | Self::InsufficientBalance { .. } => 422,
        }
    }
}

impl From<WithdrawalError> for AppError {
    fn from(err: WithdrawalError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::Validation(message),
            409 => Self::Conflict(message),
            _ => Self::BusinessRule(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_maps_to_app_error() {
        let err: AppError = WithdrawalError::PendingRequestExists.into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = WithdrawalError::InsufficientBalance {
            requested: dec!(10),
            available: dec!(5),
        }
        .into();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.details(), "Requested 10 exceeds available balance 5");

        let err: AppError = WithdrawalError::MissingBankDetails.into();
        assert_eq!(err.status_code(), 400);
    }
}
