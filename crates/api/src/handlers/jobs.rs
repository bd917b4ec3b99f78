//! Handlers for the `/jobs` resource.
//!
//! Asynchronous face swaps: the task is submitted inside the request, the
//! job row is returned right away, and polling continues in the background
//! (see [`crate::background::fusion_jobs`]).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use faceswap_core::error::CoreError;
use faceswap_core::types::DbId;
use faceswap_db::models::fusion_job::{
    CreateFusionJob, FailFusionJob, FusionJob, FusionJobListQuery,
};
use faceswap_db::repositories::FusionJobRepo;

use crate::background::fusion_jobs;
use crate::error::{AppError, AppResult};
use crate::handlers::upload::read_face_swap_upload;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a non-deleted job by ID or return 404.
async fn find_job(pool: &sqlx::PgPool, job_id: DbId) -> AppResult<FusionJob> {
    FusionJobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FusionJob",
            id: job_id,
        }))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Accepts `multipart/form-data` with `source` and `target` files. Submits
/// the task to the compute service and returns 202 with the job row in
/// `polling` status. A failed submission marks the job failed and returns
/// 500.
pub async fn submit_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let upload = read_face_swap_upload(multipart).await?;

    let job = FusionJobRepo::create(
        &state.pool,
        &CreateFusionJob {
            source_file_name: upload.source.file_name.clone(),
            target_file_name: upload.target.file_name.clone(),
        },
    )
    .await?;

    let output_path = match state.fusion.submit(&upload).await {
        Ok(token) => token,
        Err(err) => {
            FusionJobRepo::fail(
                &state.pool,
                job.id,
                &FailFusionJob {
                    error_message: err.to_string(),
                    upstream_status: None,
                    error_details: None,
                    poll_attempts: 0,
                },
            )
            .await?;
            return Err(err.into());
        }
    };

    let started = fusion_jobs::start_polling(
        &state.pool,
        &state.fusion,
        &state.jobs,
        job.id,
        output_path,
    )
    .await?;
    let job = match started {
        Some(job) => job,
        // Cancelled while the create call was in flight.
        None => find_job(&state.pool, job.id).await?,
    };

    tracing::info!(job_id = job.id, "Fusion job submitted");

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: job })))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs
///
/// List jobs newest first. Supports optional `status_id`, `limit`, and
/// `offset` query parameters.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<FusionJobListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = FusionJobRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state.pool, job_id).await?;
    Ok(Json(DataResponse { data: job }))
}

// ---------------------------------------------------------------------------
// Cancel / delete
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/{id}/cancel
///
/// Cancel a submitted or polling job and stop its poller. Returns 204 on
/// success, 409 if the job is already in a terminal state.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_job(&state.pool, job_id).await?;

    if !FusionJobRepo::cancel(&state.pool, job_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Job is already in a terminal state and cannot be cancelled".into(),
        )));
    }
    state.jobs.cancel(job_id).await;

    tracing::info!(job_id, "Fusion job cancelled");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/jobs/{id}
///
/// Soft-delete a job. An unfinished job is cancelled first. The stored
/// artifact, if any, is kept.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state.pool, job_id).await?;

    if !job.is_terminal() {
        FusionJobRepo::cancel(&state.pool, job_id).await?;
        state.jobs.cancel(job_id).await;
    }

    if !FusionJobRepo::soft_delete(&state.pool, job_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "FusionJob",
            id: job_id,
        }));
    }

    tracing::info!(job_id, "Fusion job deleted");

    Ok(StatusCode::NO_CONTENT)
}
