//! Admin routes: registrations, affiliates, UTM rates and withdrawals.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::extractors::{AdminUser, ValidJson, ValidPath};
use crate::response::{ApiResult, success};
use leadboard_core::withdrawal::Decision;
use leadboard_shared::AppError;
use leadboard_store::workflows::ApproveInput;

/// Creates the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/registrations", get(list_registrations))
        .route(
            "/admin/registrations/{username}/approve",
            post(approve_registration),
        )
        .route("/admin/registrations/{username}", delete(reject_registration))
        .route("/admin/affiliates", get(list_affiliates))
        .route("/admin/affiliates/{username}", delete(remove_affiliate))
        .route("/admin/utm", get(list_utm))
        .route("/admin/utm/refresh", post(refresh_utm))
        .route("/admin/utm/{utm_id}", put(update_utm_rate))
        .route("/admin/withdrawals", get(list_withdrawals))
        .route("/admin/withdrawals/{id}/decision", post(decide_withdrawal))
}

/// Request body for a rate change.
#[derive(Debug, Deserialize)]
pub struct RateUpdate {
    /// New payout per lead.
    pub rate_per_lead: Decimal,
}

/// Request body for a withdrawal decision.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// `approve` or `reject`.
    pub decision: Decision,
}

// ============================================================================
// Registrations
// ============================================================================

/// GET /admin/registrations - Pending sign-ups.
async fn list_registrations(_admin: AdminUser, State(state): State<AppState>) -> ApiResult {
    let registrations = state
        .workbook
        .registrations()
        .list()
        .await
        .map_err(AppError::from)?;

    Ok(success(
        StatusCode::OK,
        "Pending registrations",
        json!({ "registrations": registrations }),
    ))
}

/// POST /admin/registrations/{username}/approve - Approve a sign-up.
async fn approve_registration(
    admin: AdminUser,
    State(state): State<AppState>,
    ValidPath(username): ValidPath<String>,
    ValidJson(payload): ValidJson<ApproveInput>,
) -> ApiResult {
    let approval = state.workbook.approve(&username, payload).await?;
    info!(admin = %admin.0.username(), username = %approval.credential.username, "Admin approved registration");

    Ok(success(
        StatusCode::OK,
        "Registration approved",
        json!({
            "affiliate": approval.credential,
            "utm_summary": approval.summary,
        }),
    ))
}

/// DELETE /admin/registrations/{username} - Reject a pending sign-up.
async fn reject_registration(
    _admin: AdminUser,
    State(state): State<AppState>,
    ValidPath(username): ValidPath<String>,
) -> ApiResult {
    state.workbook.reject(&username).await?;
    Ok(success(StatusCode::OK, "Registration rejected", json!(null)))
}

// ============================================================================
// Affiliates
// ============================================================================

/// GET /admin/affiliates - Approved affiliates, without password hashes.
async fn list_affiliates(_admin: AdminUser, State(state): State<AppState>) -> ApiResult {
    let affiliates = state
        .workbook
        .credentials()
        .list()
        .await
        .map_err(AppError::from)?;

    Ok(success(
        StatusCode::OK,
        "Approved affiliates",
        json!({ "affiliates": affiliates }),
    ))
}

/// DELETE /admin/affiliates/{username} - Revoke an affiliate's access.
async fn remove_affiliate(
    _admin: AdminUser,
    State(state): State<AppState>,
    ValidPath(username): ValidPath<String>,
) -> ApiResult {
    state.workbook.remove_affiliate(&username).await?;
    Ok(success(StatusCode::OK, "Affiliate removed", json!(null)))
}

// ============================================================================
// UTM summaries
// ============================================================================

/// GET /admin/utm - UTM summary rows.
async fn list_utm(_admin: AdminUser, State(state): State<AppState>) -> ApiResult {
    let summaries = state
        .workbook
        .utm_summaries()
        .list()
        .await
        .map_err(AppError::from)?;

    Ok(success(
        StatusCode::OK,
        "UTM summaries",
        json!({ "utm_summaries": summaries }),
    ))
}

/// PUT /admin/utm/{utm_id} - Change the payout rate.
async fn update_utm_rate(
    _admin: AdminUser,
    State(state): State<AppState>,
    ValidPath(utm_id): ValidPath<String>,
    ValidJson(payload): ValidJson<RateUpdate>,
) -> ApiResult {
    let summary = state
        .workbook
        .set_rate(&utm_id, payload.rate_per_lead)
        .await?;

    Ok(success(
        StatusCode::OK,
        "Rate updated",
        json!({ "utm_summary": summary }),
    ))
}

/// POST /admin/utm/refresh - Recount leads from the lead report.
async fn refresh_utm(_admin: AdminUser, State(state): State<AppState>) -> ApiResult {
    let summaries = state.workbook.refresh_summaries().await?;

    Ok(success(
        StatusCode::OK,
        "Lead counts refreshed",
        json!({ "utm_summaries": summaries }),
    ))
}

// ============================================================================
// Withdrawals
// ============================================================================

/// GET /admin/withdrawals - Every withdrawal request.
async fn list_withdrawals(_admin: AdminUser, State(state): State<AppState>) -> ApiResult {
    let withdrawals = state
        .workbook
        .withdrawals()
        .list()
        .await
        .map_err(AppError::from)?;

    Ok(success(
        StatusCode::OK,
        "Withdrawal requests",
        json!({ "withdrawals": withdrawals }),
    ))
}

/// POST /admin/withdrawals/{id}/decision - Approve or reject a request.
async fn decide_withdrawal(
    _admin: AdminUser,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<DecisionRequest>,
) -> ApiResult {
    let withdrawal = state.workbook.decide(id, payload.decision).await?;
    let message = match payload.decision {
        Decision::Approve => "Withdrawal approved",
        Decision::Reject => "Withdrawal rejected",
    };

    Ok(success(
        StatusCode::OK,
        message,
        json!({ "withdrawal": withdrawal }),
    ))
}
