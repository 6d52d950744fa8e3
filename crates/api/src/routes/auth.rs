//! Login and session routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::extractors::ValidJson;
use crate::middleware::AuthUser;
use crate::response::{ApiResult, success};
use leadboard_shared::AppError;
use leadboard_shared::auth::{LoginRequest, LoginResponse};

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Routes that need a valid session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// POST /auth/login - Check credentials and issue a session token.
async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> ApiResult {
    let user = state
        .workbook
        .authenticate(&payload.username, &payload.password)
        .await?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user.username, user.role, user.utm_id.clone())
        .map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            AppError::Internal("An error occurred during login".to_string())
        })?;

    info!(username = %user.username, role = %user.role, "User logged in");

    let response = LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        user,
        access_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// GET /auth/me - Session info from the token.
async fn me(auth: AuthUser) -> Response {
    let claims = auth.claims();
    success(
        StatusCode::OK,
        "Session is valid",
        json!({
            "user": {
                "username": claims.username(),
                "role": auth.role(),
                "utm_id": claims.utm,
            },
            "expires_at": claims.exp,
        }),
    )
}
