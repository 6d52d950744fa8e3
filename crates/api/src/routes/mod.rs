//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod admin;
pub mod affiliate;
pub mod auth;
pub mod health;
pub mod registrations;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require a session; role checks happen in extractors
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(admin::routes())
        .merge(affiliate::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(registrations::routes())
        .merge(protected_routes)
}
