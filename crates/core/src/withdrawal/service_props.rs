//! Property-based tests for WithdrawalService.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::withdrawal::error::WithdrawalError;
use crate::withdrawal::service::WithdrawalService;
use crate::withdrawal::types::{Decision, WithdrawalStatus};

fn arb_status() -> impl Strategy<Value = WithdrawalStatus> {
    prop_oneof![
        Just(WithdrawalStatus::Pending),
        Just(WithdrawalStatus::Approved),
        Just(WithdrawalStatus::Rejected),
    ]
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Approve), Just(Decision::Reject)]
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Only pending requests change status, and always to the decision's target.
    #[test]
    fn prop_only_pending_transitions(status in arb_status(), decision in arb_decision()) {
        let result = WithdrawalService::decide(status, decision);
        if status == WithdrawalStatus::Pending {
            prop_assert_eq!(result.unwrap(), decision.target_status());
        } else {
            let is_invalid_transition =
                matches!(result, Err(WithdrawalError::InvalidTransition { .. }));
            prop_assert!(is_invalid_transition);
        }
    }

    /// An accepted request never overdraws the balance.
    #[test]
    fn prop_accepted_requests_fit_balance(amount in arb_amount(), available in arb_amount()) {
        if WithdrawalService::validate_request(amount, available, false).is_ok() {
            prop_assert!(amount > Decimal::ZERO);
            prop_assert!(amount <= available);
        }
    }
}
