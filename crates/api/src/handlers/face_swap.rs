//! Synchronous face swap: the request stays open until the compute
//! service reaches a terminal status.

use axum::extract::{Multipart, State};
use axum::Json;
use faceswap_fusion::runner::FusionOutcome;

use crate::error::{AppError, AppResult};
use crate::handlers::upload::read_face_swap_upload;
use crate::response::FaceSwapResponse;
use crate::state::AppState;

/// POST /api/v1/face-swap
///
/// Accepts `multipart/form-data` with `source` and `target` files, runs the
/// task to completion and returns the stored filename. Terminal upstream
/// failures (400, 404, 500) are returned with the upstream status and body.
pub async fn face_swap(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<FaceSwapResponse>> {
    let upload = read_face_swap_upload(multipart).await?;
    let cancel = state.shutdown.child_token();

    match state.fusion.run(&upload, &cancel).await? {
        FusionOutcome::Stored {
            filename, attempts, ..
        } => {
            tracing::info!(filename = %filename, attempts, "Face swap completed");
            Ok(Json(FaceSwapResponse {
                message: "Face swap completed".to_string(),
                filename,
            }))
        }
        FusionOutcome::Rejected { status, body, .. } => Err(AppError::Upstream { status, body }),
    }
}
