//! Withdrawal status transitions and request validation.

use rust_decimal::Decimal;

use crate::withdrawal::error::WithdrawalError;
use crate::withdrawal::types::{Decision, WithdrawalStatus};

/// Stateless rules for the withdrawal workflow.
pub struct WithdrawalService;

impl WithdrawalService {
    /// Applies an admin decision to the current status.
    ///
    /// # Errors
    ///
    /// Returns `WithdrawalError::InvalidTransition` unless `current` is
    /// `Pending`.
    pub fn decide(
        current: WithdrawalStatus,
        decision: Decision,
    ) -> Result<WithdrawalStatus, WithdrawalError> {
        let to = decision.target_status();
        if current.is_final() {
            return Err(WithdrawalError::InvalidTransition { from: current, to });
        }
        Ok(to)
    }

    /// Checks a new request against the affiliate's balance.
    ///
    /// `available` must already exclude pending and approved requests.
    ///
    /// # Errors
    ///
    /// - `NonPositiveAmount` when `amount <= 0`
    /// - `PendingRequestExists` when another request is still pending
    /// - `InsufficientBalance` when `amount > available`
    pub fn validate_request(
        amount: Decimal,
        available: Decimal,
        has_pending: bool,
    ) -> Result<(), WithdrawalError> {
        if amount <= Decimal::ZERO {
            return Err(WithdrawalError::NonPositiveAmount);
        }
        if has_pending {
            return Err(WithdrawalError::PendingRequestExists);
        }
        if amount > available {
            return Err(WithdrawalError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pending_can_be_approved_or_rejected() {
        assert_eq!(
            WithdrawalService::decide(WithdrawalStatus::Pending, Decision::Approve).unwrap(),
            WithdrawalStatus::Approved
        );
        assert_eq!(
            WithdrawalService::decide(WithdrawalStatus::Pending, Decision::Reject).unwrap(),
            WithdrawalStatus::Rejected
        );
    }

    #[test]
    fn test_decided_request_is_final() {
        let err = WithdrawalService::decide(WithdrawalStatus::Rejected, Decision::Approve)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot move withdrawal from Rejected to Approved"
        );
    }

    #[test]
    fn test_validate_request() {
        assert!(WithdrawalService::validate_request(dec!(100), dec!(100), false).is_ok());
        assert!(matches!(
            WithdrawalService::validate_request(dec!(0), dec!(100), false),
            Err(WithdrawalError::NonPositiveAmount)
        ));
        assert!(matches!(
            WithdrawalService::validate_request(dec!(10), dec!(100), true),
            Err(WithdrawalError::PendingRequestExists)
        ));
        assert!(matches!(
            WithdrawalService::validate_request(dec!(100.01), dec!(100), false),
            Err(WithdrawalError::InsufficientBalance { .. })
        ));
    }
}
