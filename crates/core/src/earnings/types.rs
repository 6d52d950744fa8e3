//! UTM summary rows and earnings snapshots.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::earnings::error::EarningsError;
use crate::withdrawal::{WithdrawalRequest, WithdrawalStatus};

/// Earnings for a number of leads at a per-lead rate.
///
/// # Errors
///
/// Returns `EarningsError::Overflow` when the product does not fit.
pub fn earnings_for(leads: u64, rate_per_lead: Decimal) -> Result<Decimal, EarningsError> {
    Decimal::from(leads)
        .checked_mul(rate_per_lead)
        .ok_or(EarningsError::Overflow {
            leads,
            rate_per_lead,
        })
}

/// One row of the UTM summary tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UtmSummary {
    /// UTM id.
    pub utm_id: String,
    /// Lead count at the last refresh.
    pub lead_count: u64,
    /// Payout per lead.
    pub rate_per_lead: Decimal,
    /// `lead_count * rate_per_lead`.
    pub earnings: Decimal,
}

impl UtmSummary {
    /// Creates a row with earnings derived from count and rate.
    ///
    /// # Errors
    ///
    /// Returns `EarningsError::Overflow` when count × rate does not fit.
    pub fn new(
        utm_id: impl Into<String>,
        lead_count: u64,
        rate_per_lead: Decimal,
    ) -> Result<Self, EarningsError> {
        Ok(Self {
            utm_id: utm_id.into(),
            lead_count,
            rate_per_lead,
            earnings: earnings_for(lead_count, rate_per_lead)?,
        })
    }

    /// Returns the row with a new lead count and recomputed earnings.
    ///
    /// # Errors
    ///
    /// Returns `EarningsError::Overflow` when count × rate does not fit.
    pub fn with_leads(self, lead_count: u64) -> Result<Self, EarningsError> {
        Self::new(self.utm_id, lead_count, self.rate_per_lead)
    }

    /// Returns the row with a new rate and recomputed earnings.
    ///
    /// # Errors
    ///
    /// Returns `EarningsError::Overflow` when count × rate does not fit.
    pub fn with_rate(self, rate_per_lead: Decimal) -> Result<Self, EarningsError> {
        Self::new(self.utm_id, self.lead_count, rate_per_lead)
    }
}

/// Money already paid out or held by pending requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// Sum of approved withdrawals.
    pub withdrawn: Decimal,
    /// Sum of pending withdrawals.
    pub pending: Decimal,
    /// Earnings left to request.
    pub available: Decimal,
}

impl Balance {
    /// Computes the balance of `earnings` against a user's withdrawal history.
    ///
    /// Rejected requests do not count. `available` never goes below zero.
    ///
    /// # Errors
    ///
    /// Returns `EarningsError::BalanceOverflow` when a total does not fit.
    pub fn compute(
        earnings: Decimal,
        requests: &[WithdrawalRequest],
    ) -> Result<Self, EarningsError> {
        let sum_status = |status: WithdrawalStatus| -> Result<Decimal, EarningsError> {
            requests
                .iter()
                .filter(|r| r.status == status)
                .try_fold(Decimal::ZERO, |total, r| total.checked_add(r.amount))
                .ok_or(EarningsError::BalanceOverflow)
        };
        let withdrawn = sum_status(WithdrawalStatus::Approved)?;
        let pending = sum_status(WithdrawalStatus::Pending)?;
        let available = earnings
            .checked_sub(withdrawn)
            .and_then(|left| left.checked_sub(pending))
            .ok_or(EarningsError::BalanceOverflow)?;

        Ok(Self {
            withdrawn,
            pending,
            available: available.max(Decimal::ZERO),
        })
    }
}

/// What an affiliate's dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarningsSnapshot {
    /// Affiliate username.
    pub username: String,
    /// Assigned UTM id.
    pub utm_id: String,
    /// Live lead count from the lead report.
    pub leads: u64,
    /// Payout per lead.
    pub rate_per_lead: Decimal,
    /// `leads * rate_per_lead`.
    pub earnings: Decimal,
    /// Withdrawal totals.
    #[serde(flatten)]
    pub balance: Balance,
}
