//! Request extractors.
//!
//! The role extractors read the claims the auth middleware stored and refuse
//! sessions of the wrong role with 403. `ValidJson` and `ValidPath` wrap
//! axum's extractors so malformed bodies and path segments come back as 400
//! `validation_error` in the usual error envelope.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
    response::Response,
};
use leadboard_shared::{AppError, Claims, Role};

use crate::middleware::AuthUser;
use crate::response::{ApiError, error_response};

/// The admin session.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

/// An affiliate session.
#[derive(Debug, Clone)]
pub struct AffiliateUser {
    /// Affiliate username.
    pub username: String,
}

fn forbidden(message: &str) -> Response {
    error_response(StatusCode::FORBIDDEN, "forbidden", message)
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            return Err(forbidden("Admin access required"));
        }
        Ok(Self(claims))
    }
}

impl<S> FromRequestParts<S> for AffiliateUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if auth.role() != Role::Affiliate {
            return Err(forbidden("Affiliate access required"));
        }
        Ok(Self {
            username: auth.username().to_string(),
        })
    }
}

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError(AppError::Validation(rejection.body_text())))?;
        Ok(Self(value))
    }
}

/// Path parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError(AppError::Validation(rejection.body_text())))?;
        Ok(Self(value))
    }
}
