//! Withdrawal domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::withdrawal::error::WithdrawalError;

/// Status of a withdrawal request.
///
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    /// Waiting for an admin.
    Pending,
    /// Paid out; the affiliate's login has been removed.
    Approved,
    /// Declined by the admin.
    Rejected,
}

impl WithdrawalStatus {
    /// Returns the value stored in the status column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Parses a status cell, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once an admin has decided.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An admin's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Pay out.
    Approve,
    /// Decline.
    Reject,
}

impl Decision {
    /// Status a pending request moves to.
    #[must_use]
    pub fn target_status(&self) -> WithdrawalStatus {
        match self {
            Self::Approve => WithdrawalStatus::Approved,
            Self::Reject => WithdrawalStatus::Rejected,
        }
    }
}

/// Bank account a payout goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    /// Name on the account.
    pub account_holder: String,
    /// Account number, digits only once validated.
    pub account_number: String,
    /// Bank name.
    pub bank_name: String,
    /// IFSC branch code.
    pub ifsc_code: String,
}

impl BankDetails {
    /// Validates the fields and returns a normalized copy.
    ///
    /// Spaces are removed from the account number and the IFSC code is
    /// uppercased. IFSC codes are four letters, a zero, then six letters or
    /// digits.
    ///
    /// # Errors
    ///
    /// Returns `WithdrawalError::InvalidBankDetails` naming the bad field.
    pub fn validated(&self) -> Result<Self, WithdrawalError> {
        let account_holder = self.account_holder.trim().to_string();
        if account_holder.is_empty() {
            return Err(WithdrawalError::InvalidBankDetails("account_holder is required"));
        }

        let account_number: String = self
            .account_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if !(6..=20).contains(&account_number.len())
            || !account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(WithdrawalError::InvalidBankDetails(
                "account_number must be 6-20 digits",
            ));
        }

        let bank_name = self.bank_name.trim().to_string();
        if bank_name.is_empty() {
            return Err(WithdrawalError::InvalidBankDetails("bank_name is required"));
        }

        let ifsc_code = self.ifsc_code.trim().to_uppercase();
        let bytes = ifsc_code.as_bytes();
        let ifsc_ok = bytes.len() == 11
            && bytes[..4].iter().all(u8::is_ascii_uppercase)
            && bytes[4] == b'0'
            && bytes[5..].iter().all(u8::is_ascii_alphanumeric);
        if !ifsc_ok {
            return Err(WithdrawalError::InvalidBankDetails(
                "ifsc_code must look like ABCD0123456",
            ));
        }

        Ok(Self {
            account_holder,
            account_number,
            bank_name,
            ifsc_code,
        })
    }
}

/// A withdrawal request row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    /// Request ID.
    pub id: Uuid,
    /// Requesting affiliate.
    pub username: String,
    /// Requested amount.
    pub amount: Decimal,
    /// Bank details at the time of the request.
    pub bank: BankDetails,
    /// Current status.
    pub status: WithdrawalStatus,
    /// When the affiliate asked.
    pub requested_at: DateTime<Utc>,
    /// When the admin decided.
    pub decided_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bank() -> BankDetails {
        BankDetails {
            account_holder: " Asha Rao ".into(),
            account_number: "1234 5678 9012".into(),
            bank_name: "State Bank".into(),
            ifsc_code: "sbin0001234".into(),
        }
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!(WithdrawalStatus::parse(" approved "), Some(WithdrawalStatus::Approved));
        assert_eq!(WithdrawalStatus::parse("PENDING"), Some(WithdrawalStatus::Pending));
        assert_eq!(WithdrawalStatus::parse("paid"), None);
        assert_eq!(WithdrawalStatus::Rejected.to_string(), "Rejected");
        assert!(WithdrawalStatus::Approved.is_final());
        assert!(!WithdrawalStatus::Pending.is_final());
    }

    #[test]
    fn test_decision_serde() {
        let decision: Decision = serde_json::from_str("\"approve\"").unwrap();
        assert_eq!(decision.target_status(), WithdrawalStatus::Approved);
        assert_eq!(Decision::Reject.target_status(), WithdrawalStatus::Rejected);
    }

    #[test]
    fn test_bank_details_normalized() {
        let details = bank().validated().unwrap();
        assert_eq!(details.account_holder, "Asha Rao");
        assert_eq!(details.account_number, "123456789012");
        assert_eq!(details.ifsc_code, "SBIN0001234");
    }

    #[rstest]
    #[case::no_holder(|b: &mut BankDetails| b.account_holder = String::new())]
    #[case::short_account(|b: &mut BankDetails| b.account_number = "123".into())]
    #[case::letters_in_account(|b: &mut BankDetails| b.account_number = "12345abc".into())]
    #[case::no_bank(|b: &mut BankDetails| b.bank_name = "  ".into())]
    #[case::bad_ifsc_fifth(|b: &mut BankDetails| b.ifsc_code = "SBIN1001234".into())]
    #[case::bad_ifsc_len(|b: &mut BankDetails| b.ifsc_code = "SBIN000123".into())]
    fn test_bank_details_rejected(#[case] mutate: fn(&mut BankDetails)) {
        let mut details = bank();
        mutate(&mut details);
        assert!(matches!(
            details.validated(),
            Err(WithdrawalError::InvalidBankDetails(_))
        ));
    }
}
