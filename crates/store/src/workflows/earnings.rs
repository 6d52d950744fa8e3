//! Dashboard figures and UTM summary maintenance.

use leadboard_core::affiliate::{Credential, normalize_username};
use leadboard_core::earnings::{Balance, EarningsSnapshot, UtmSummary, earnings_for};
use leadboard_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::info;

use super::Workbook;

impl Workbook {
    pub(super) async fn approved(&self, username: &str) -> AppResult<Credential> {
        self.credentials
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No approved affiliate named {username}")))
    }

    pub(super) async fn snapshot_for(&self, credential: &Credential) -> AppResult<EarningsSnapshot> {
        let leads = self.lead_report.leads_for(&credential.utm_id).await?;
        let rate_per_lead = self
            .utm_summaries
            .find(&credential.utm_id)
            .await?
            .map_or_else(|| self.utm_summaries.default_rate(), |s| s.rate_per_lead);
        let earnings = earnings_for(leads, rate_per_lead)?;
        let requests = self.withdrawals.list_for_user(&credential.username).await?;

        Ok(EarningsSnapshot {
            username: credential.username.clone(),
            utm_id: credential.utm_id.clone(),
            leads,
            rate_per_lead,
            earnings,
            balance: Balance::compute(earnings, &requests)?,
        })
    }

    /// Live lead count, earnings and withdrawal balance for an affiliate.
    ///
    /// # Errors
    ///
    /// - `NotFound` when `username` has no credential
    /// - `BusinessRule` when leads × rate or the withdrawal totals are out
    ///   of range
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn dashboard(&self, username: &str) -> AppResult<EarningsSnapshot> {
        let credential = self.approved(&normalize_username(username)).await?;
        self.snapshot_for(&credential).await
    }

    /// Rewrites the lead count and earnings of every summary row from the
    /// lead report. Returns the rows as they now stand.
    ///
    /// # Errors
    ///
    /// - `BusinessRule` when a row's leads × rate is out of range; rows
    ///   before it have already been rewritten
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn refresh_summaries(&self) -> AppResult<Vec<UtmSummary>> {
        let _guard = self.lock().await;

        let counts = self.lead_report.all_counts().await?;
        let mut refreshed = Vec::new();
        let mut changed = 0usize;

        for row in self.utm_summaries.list().await? {
            let leads = counts
                .get(&row.utm_id.to_lowercase())
                .copied()
                .unwrap_or(0);
            let updated = row.clone().with_leads(leads)?;
            // The sheet may hold a stale earnings cell even when the count
            // is unchanged, so always write.
            self.utm_summaries.upsert(&updated).await?;
            if updated.lead_count != row.lead_count {
                changed += 1;
            }
            refreshed.push(updated);
        }

        info!(rows = refreshed.len(), changed, "UTM summaries refreshed");
        Ok(refreshed)
    }

    /// Changes the payout rate of a UTM summary row.
    ///
    /// # Errors
    ///
    /// - `Validation` when `rate_per_lead` is negative
    /// - `NotFound` when no row exists for `utm_id`
    /// - `BusinessRule` when leads × the new rate is out of range
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn set_rate(&self, utm_id: &str, rate_per_lead: Decimal) -> AppResult<UtmSummary> {
        if rate_per_lead < Decimal::ZERO {
            return Err(AppError::Validation(
                "rate_per_lead must not be negative".to_string(),
            ));
        }

        let _guard = self.lock().await;

        let row = self
            .utm_summaries
            .find(utm_id.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No UTM summary for {utm_id}")))?;
        let updated = row.with_rate(rate_per_lead)?;
        self.utm_summaries.upsert(&updated).await?;

        info!(utm_id = %updated.utm_id, rate_per_lead = %rate_per_lead, "UTM rate updated");
        Ok(updated)
    }
}
