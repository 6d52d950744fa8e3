//! Public affiliate sign-up.

use axum::{Router, extract::State, http::StatusCode, routing::post};
use serde_json::json;

use crate::AppState;
use crate::extractors::ValidJson;
use crate::response::{ApiResult, success};
use leadboard_core::affiliate::NewRegistration;

/// Creates the sign-up router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/registrations", post(register))
}

/// POST /registrations - Submit a sign-up for admin approval.
async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewRegistration>,
) -> ApiResult {
    let registration = state.workbook.register(payload).await?;

    Ok(success(
        StatusCode::CREATED,
        "Registration submitted, awaiting admin approval",
        json!({ "registration": registration }),
    ))
}
