pub mod face_swap;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /jobs                         list, submit
/// /jobs/{id}                    get, soft delete
/// /jobs/{id}/cancel             cancel (POST)
/// ```
///
/// `/api/v1/face-swap` is mounted separately by
/// [`crate::router::build_app_router`] so it escapes the request timeout.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/jobs", jobs::router())
}
