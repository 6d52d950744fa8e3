//! JSON response envelopes.
//!
//! Success: `{ "success": true, "message": ..., ...payload }`.
//! Failure: `{ "error": <code>, "details": <message> }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use leadboard_shared::AppError;
use serde_json::{Value, json};
use tracing::error;

/// Handler result.
pub type ApiResult<T = Response> = Result<T, ApiError>;

/// An application error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Builds an error response from a status, code and message.
pub fn error_response(status: StatusCode, code: &str, details: &str) -> Response {
    (status, Json(json!({ "error": code, "details": details }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        error_response(status, self.0.error_code(), self.0.details())
    }
}

/// Builds a success response. Fields of an object `payload` are merged into
/// the envelope; any other value is placed under `data`.
pub fn success(status: StatusCode, message: &str, payload: Value) -> Response {
    let mut body = json!({ "success": true, "message": message });
    if let Value::Object(map) = &mut body {
        match payload {
            Value::Object(fields) => map.extend(fields),
            Value::Null => {}
            other => {
                map.insert("data".to_string(), other);
            }
        }
    }
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_merges_payload() {
        let response = success(StatusCode::CREATED, "Created", json!({ "id": 7 }));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({ "success": true, "message": "Created", "id": 7 })
        );
    }

    #[tokio::test]
    async fn test_success_wraps_non_objects() {
        let response = success(StatusCode::OK, "Listed", json!([1, 2]));
        assert_eq!(body_json(response).await["data"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_app_error_envelope() {
        let response = ApiError(AppError::Conflict("Username is already taken".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "conflict", "details": "Username is already taken" })
        );
    }
}
