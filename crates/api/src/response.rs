//! Shared response envelope types for API handlers.
//!
//! Resource endpoints use a `{ "data": ... }` envelope. The synchronous
//! face-swap endpoint answers with [`FaceSwapResponse`] directly.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: job }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body of a successful `POST /api/v1/face-swap`.
#[derive(Debug, Serialize)]
pub struct FaceSwapResponse {
    pub message: String,
    /// Name of the stored artifact, served under `/outputs/{filename}`.
    pub filename: String,
}
