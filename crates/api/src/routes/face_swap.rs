use axum::routing::post;
use axum::Router;

use crate::handlers::face_swap;
use crate::state::AppState;

/// Full path of the synchronous face-swap endpoint.
pub const FACE_SWAP_PATH: &str = "/api/v1/face-swap";

/// Mount the synchronous face-swap route at [`FACE_SWAP_PATH`].
pub fn router() -> Router<AppState> {
    Router::new().route(FACE_SWAP_PATH, post(face_swap::face_swap))
}
