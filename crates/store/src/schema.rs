//! Tab layouts and header bootstrap.

use leadboard_shared::config::TabNames;
use tracing::info;

use crate::sheet::{SheetError, TabularStore, row_of};

/// Header of the pending registrations tab.
pub const REGISTRATION_HEADERS: &[&str] = &[
    "name",
    "email",
    "social_link",
    "mobile",
    "username",
    "password_hash",
    "utm_id",
    "submitted_at",
];

/// Header of the approved credentials tab.
pub const CREDENTIAL_HEADERS: &[&str] =
    &["username", "password_hash", "utm_id", "name", "approved_at"];

/// Header of the UTM summary tab.
pub const UTM_SUMMARY_HEADERS: &[&str] = &["utm_id", "lead_count", "rate_per_lead", "earnings"];

/// Header of the withdrawals tab.
pub const WITHDRAWAL_HEADERS: &[&str] = &[
    "id",
    "username",
    "amount",
    "account_holder",
    "account_number",
    "bank_name",
    "ifsc_code",
    "status",
    "requested_at",
    "decided_at",
];

/// Header of the bank details tab.
pub const BANK_DETAILS_HEADERS: &[&str] = &[
    "username",
    "account_holder",
    "account_number",
    "bank_name",
    "ifsc_code",
    "updated_at",
];

/// Tabs this application owns, paired with their headers. The lead report
/// is produced elsewhere and is not listed.
#[must_use]
pub fn managed_tabs(tabs: &TabNames) -> [(&str, &'static [&'static str]); 5] {
    [
        (tabs.registrations.as_str(), REGISTRATION_HEADERS),
        (tabs.credentials.as_str(), CREDENTIAL_HEADERS),
        (tabs.utm_summary.as_str(), UTM_SUMMARY_HEADERS),
        (tabs.withdrawals.as_str(), WITHDRAWAL_HEADERS),
        (tabs.bank_details.as_str(), BANK_DETAILS_HEADERS),
    ]
}

/// Writes the header row into every managed tab that has no rows yet.
///
/// Returns the names of the tabs that received a header. Tabs that already
/// hold data are left alone even if their header differs.
///
/// # Errors
///
/// Returns the first store error.
pub async fn ensure_headers(
    store: &dyn TabularStore,
    tabs: &TabNames,
) -> Result<Vec<String>, SheetError> {
    let mut created = Vec::new();

    for (tab, headers) in managed_tabs(tabs) {
        let rows = store.read_rows(tab).await?;
        if rows.iter().any(|row| !crate::sheet::is_blank(row)) {
            continue;
        }
        store.append_rows(tab, vec![row_of(headers)]).await?;
        info!(tab = %tab, backend = store.backend_tag(), "Wrote tab header");
        created.push(tab.to_string());
    }

    Ok(created)
}
