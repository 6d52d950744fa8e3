//! Affiliate routes: dashboard, bank details and withdrawals.

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde_json::json;

use crate::AppState;
use crate::extractors::{AffiliateUser, ValidJson};
use crate::response::{ApiResult, success};
use leadboard_core::withdrawal::BankDetails;
use leadboard_shared::AppError;
use leadboard_store::workflows::WithdrawalInput;

/// Creates the affiliate router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/affiliate/dashboard", get(dashboard))
        .route(
            "/affiliate/bank-details",
            get(get_bank_details).put(put_bank_details),
        )
        .route(
            "/affiliate/withdrawals",
            get(list_withdrawals).post(request_withdrawal),
        )
}

/// GET /affiliate/dashboard - Leads, rate, earnings and balance.
async fn dashboard(affiliate: AffiliateUser, State(state): State<AppState>) -> ApiResult {
    let snapshot = state.workbook.dashboard(&affiliate.username).await?;
    Ok(success(
        StatusCode::OK,
        "Dashboard",
        json!({ "dashboard": snapshot }),
    ))
}

/// GET /affiliate/bank-details - Stored bank account, or null.
async fn get_bank_details(affiliate: AffiliateUser, State(state): State<AppState>) -> ApiResult {
    let bank = state.workbook.bank_details_for(&affiliate.username).await?;
    Ok(success(
        StatusCode::OK,
        "Bank details",
        json!({ "bank_details": bank }),
    ))
}

/// PUT /affiliate/bank-details - Save the bank account.
async fn put_bank_details(
    affiliate: AffiliateUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<BankDetails>,
) -> ApiResult {
    let bank = state
        .workbook
        .update_bank_details(&affiliate.username, &payload)
        .await?;
    Ok(success(
        StatusCode::OK,
        "Bank details saved",
        json!({ "bank_details": bank }),
    ))
}

/// GET /affiliate/withdrawals - Own withdrawal history.
async fn list_withdrawals(affiliate: AffiliateUser, State(state): State<AppState>) -> ApiResult {
    let withdrawals = state
        .workbook
        .withdrawals()
        .list_for_user(&affiliate.username)
        .await
        .map_err(AppError::from)?;
    Ok(success(
        StatusCode::OK,
        "Withdrawal requests",
        json!({ "withdrawals": withdrawals }),
    ))
}

/// POST /affiliate/withdrawals - Request a payout.
async fn request_withdrawal(
    affiliate: AffiliateUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<WithdrawalInput>,
) -> ApiResult {
    let withdrawal = state
        .workbook
        .request_withdrawal(&affiliate.username, payload)
        .await?;
    Ok(success(
        StatusCode::CREATED,
        "Withdrawal requested",
        json!({ "withdrawal": withdrawal }),
    ))
}
