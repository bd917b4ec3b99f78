use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use faceswap_core::error::CoreError;
use faceswap_fusion::poller::PollError;
use faceswap_fusion::runner::FusionError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `faceswap_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeds the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The compute service ended the task with a terminal failure status.
    /// Status and body are passed through unchanged.
    #[error("Upstream rejected the task with status {status}")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },

    /// A status query failed at the transport level. The message is
    /// returned to the caller.
    #[error("Fusion failed: {0}")]
    FusionFailed(String),

    /// Polling gave up after the configured number of attempts.
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// The server is shutting down.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<FusionError> for AppError {
    fn from(err: FusionError) -> Self {
        match err {
            FusionError::Poll(PollError::Transport { .. }) => {
                AppError::FusionFailed(err.to_string())
            }
            FusionError::Poll(PollError::Exhausted { .. }) => {
                AppError::GatewayTimeout(err.to_string())
            }
            FusionError::Poll(PollError::Cancelled { .. }) => {
                AppError::Unavailable("Server is shutting down".into())
            }
            FusionError::State(core) => AppError::Core(core),
            FusionError::Submit(_) | FusionError::Storage(_) => {
                AppError::InternalError(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            // --- Upstream pass-through: status and body unchanged ---
            AppError::Upstream { status, body } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                tracing::warn!(status = status.as_u16(), "Passing through upstream failure");
                (status, "UPSTREAM_ERROR", body)
            }
            other => {
                let (status, code, message) = classify(&other);
                (status, code, serde_json::Value::String(message))
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map every non-passthrough variant to an HTTP status, error code, and message.
fn classify(err: &AppError) -> (StatusCode, &'static str, String) {
    match err {
        // --- CoreError variants ---
        AppError::Core(core) => match core {
            CoreError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            CoreError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            CoreError::InvalidTransition { .. } => {
                tracing::error!(error = %core, "Internal core error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        },

        // --- Database errors ---
        AppError::Database(err) => classify_sqlx_error(err),

        // --- HTTP-specific errors ---
        AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        AppError::PayloadTooLarge(msg) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            msg.clone(),
        ),
        AppError::Upstream { status, .. } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "UPSTREAM_ERROR",
            err.to_string(),
        ),
        AppError::FusionFailed(msg) => {
            tracing::error!(error = %msg, "Fusion polling failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "FUSION_FAILED",
                msg.clone(),
            )
        }
        AppError::GatewayTimeout(msg) => {
            (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT", msg.clone())
        }
        AppError::Unavailable(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            msg.clone(),
        ),
        AppError::InternalError(msg) => {
            tracing::error!(error = %msg, "Internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
