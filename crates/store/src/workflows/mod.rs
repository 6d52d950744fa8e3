//! Multi-tab workflows.
//!
//! A [`Workbook`] bundles one repository per tab. Operations that touch more
//! than one tab take the workbook's write lock, so two requests in this
//! process never interleave their row edits. Nothing is rolled back: if a
//! later step fails, earlier steps stay applied and the error is returned.

mod earnings;
mod onboarding;
mod payouts;

pub use onboarding::{Approval, ApproveInput};
pub use payouts::WithdrawalInput;

use std::sync::Arc;

use leadboard_core::earnings::LeadReportLayout;
use leadboard_shared::AppConfig;
use leadboard_shared::config::{AdminConfig, EarningsConfig, TabNames};
use tokio::sync::{Mutex, MutexGuard};

use crate::repositories::{
    BankDetailsRepository, CredentialRepository, LeadReportRepository, RegistrationRepository,
    UtmSummaryRepository, WithdrawalRepository,
};
use crate::sheet::TabularStore;

/// All tabs of the spreadsheet plus the admin account.
#[derive(Debug)]
pub struct Workbook {
    registrations: RegistrationRepository,
    credentials: CredentialRepository,
    utm_summaries: UtmSummaryRepository,
    lead_report: LeadReportRepository,
    withdrawals: WithdrawalRepository,
    bank_details: BankDetailsRepository,
    admin: AdminConfig,
    backend: &'static str,
    write_lock: Mutex<()>,
}

impl Workbook {
    /// Creates a workbook over `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn TabularStore>,
        tabs: &TabNames,
        earnings: &EarningsConfig,
        admin: AdminConfig,
    ) -> Self {
        let layout = LeadReportLayout::new(&earnings.report_header, &earnings.report_terminator);
        let backend = store.backend_tag();
        Self {
            registrations: RegistrationRepository::new(store.clone(), &tabs.registrations),
            credentials: CredentialRepository::new(store.clone(), &tabs.credentials),
            utm_summaries: UtmSummaryRepository::new(
                store.clone(),
                &tabs.utm_summary,
                earnings.default_rate_per_lead,
            ),
            lead_report: LeadReportRepository::new(store.clone(), &tabs.lead_report, layout),
            withdrawals: WithdrawalRepository::new(store.clone(), &tabs.withdrawals),
            bank_details: BankDetailsRepository::new(store, &tabs.bank_details),
            admin,
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a workbook from application configuration.
    #[must_use]
    pub fn from_config(store: Arc<dyn TabularStore>, config: &AppConfig) -> Self {
        Self::new(store, &config.sheets.tabs, &config.earnings, config.admin.clone())
    }

    /// Name of the store backend, for health output.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        self.backend
    }

    /// Pending registrations.
    #[must_use]
    pub const fn registrations(&self) -> &RegistrationRepository {
        &self.registrations
    }

    /// Approved credentials.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialRepository {
        &self.credentials
    }

    /// UTM summary rows.
    #[must_use]
    pub const fn utm_summaries(&self) -> &UtmSummaryRepository {
        &self.utm_summaries
    }

    /// Lead report.
    #[must_use]
    pub const fn lead_report(&self) -> &LeadReportRepository {
        &self.lead_report
    }

    /// Withdrawal requests.
    #[must_use]
    pub const fn withdrawals(&self) -> &WithdrawalRepository {
        &self.withdrawals
    }

    /// Bank details.
    #[must_use]
    pub const fn bank_details(&self) -> &BankDetailsRepository {
        &self.bank_details
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}
