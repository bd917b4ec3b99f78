//! Multipart intake shared by the face-swap and job endpoints.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use faceswap_core::upload::{FaceSwapUpload, FaceSwapUploadBuilder, UploadedFile};

use crate::error::{AppError, AppResult};

/// Read the `source` and `target` file fields from a multipart body.
///
/// Unknown fields are ignored. Returns a validation error (400) when either
/// file is missing or empty.
pub async fn read_face_swap_upload(mut multipart: Multipart) -> AppResult<FaceSwapUpload> {
    let mut builder = FaceSwapUploadBuilder::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        let file = UploadedFile {
            file_name,
            content_type,
            data: data.to_vec(),
        };
        if !builder.accept(&name, file) {
            tracing::debug!(field = %name, "Ignoring unknown multipart field");
        }
    }

    Ok(builder.build()?)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
