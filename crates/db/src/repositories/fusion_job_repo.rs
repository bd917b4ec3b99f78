//! Repository for the `fusion_jobs` table.
//!
//! Status transitions are guarded in SQL: every update that moves a job
//! forward names the statuses it may move from, so a job that already
//! reached a terminal status is never overwritten.

use faceswap_core::types::DbId;
use sqlx::PgPool;

use crate::models::fusion_job::{
    CompleteFusionJob, CreateFusionJob, FailFusionJob, FusionJob, FusionJobListQuery,
};
use crate::models::status::{FusionJobStatus, StatusId};

/// Column list for `fusion_jobs` queries.
const COLUMNS: &str = "\
    id, status_id, source_file_name, target_file_name, \
    output_path, output_filename, output_content_type, \
    upstream_status, error_message, error_details, poll_attempts, \
    submitted_at, polling_started_at, completed_at, deleted_at, \
    created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Non-terminal statuses: submitted, polling.
const ACTIVE_STATUSES: [StatusId; 2] = [
    FusionJobStatus::Submitted as StatusId,
    FusionJobStatus::Polling as StatusId,
];

/// Provides CRUD operations for fusion jobs.
pub struct FusionJobRepo;

impl FusionJobRepo {
    /// Insert a new job in `submitted` status.
    pub async fn create(pool: &PgPool, input: &CreateFusionJob) -> Result<FusionJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO fusion_jobs (status_id, source_file_name, target_file_name) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FusionJob>(&query)
            .bind(FusionJobStatus::Submitted.id())
            .bind(&input.source_file_name)
            .bind(&input.target_file_name)
            .fetch_one(pool)
            .await
    }

    /// Record the output token and move a `submitted` job to `polling`.
    ///
    /// Returns `None` if the job was no longer in `submitted` status
    /// (e.g. it was cancelled while the create call was in flight).
    pub async fn mark_polling(
        pool: &PgPool,
        job_id: DbId,
        output_path: &str,
    ) -> Result<Option<FusionJob>, sqlx::Error> {
        let query = format!(
            "UPDATE fusion_jobs \
             SET status_id = $2, output_path = $3, polling_started_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FusionJob>(&query)
            .bind(job_id)
            .bind(FusionJobStatus::Polling.id())
            .bind(output_path)
            .bind(FusionJobStatus::Submitted.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a polling job as succeeded with its stored artifact.
    ///
    /// Returns `true` if the row was updated.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        input: &CompleteFusionJob,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fusion_jobs \
             SET status_id = $2, output_filename = $3, output_content_type = $4, \
                 upstream_status = 200, poll_attempts = $5, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $6",
        )
        .bind(job_id)
        .bind(FusionJobStatus::Succeeded.id())
        .bind(&input.output_filename)
        .bind(&input.output_content_type)
        .bind(input.poll_attempts)
        .bind(FusionJobStatus::Polling.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an active job as failed.
    ///
    /// No automatic retry is performed. Returns `true` if the row was updated.
    pub async fn fail(
        pool: &PgPool,
        job_id: DbId,
        input: &FailFusionJob,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fusion_jobs \
             SET status_id = $2, error_message = $3, upstream_status = $4, \
                 error_details = $5, poll_attempts = $6, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($7, $8)",
        )
        .bind(job_id)
        .bind(FusionJobStatus::Failed.id())
        .bind(&input.error_message)
        .bind(input.upstream_status)
        .bind(&input.error_details)
        .bind(input.poll_attempts)
        .bind(ACTIVE_STATUSES[0])
        .bind(ACTIVE_STATUSES[1])
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cancel a job if it is not already in a terminal state.
    ///
    /// Returns `true` if the job was cancelled, `false` if it was already
    /// succeeded, failed, or cancelled.
    pub async fn cancel(pool: &PgPool, job_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fusion_jobs \
             SET status_id = $2, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND status_id IN ($3, $4)",
        )
        .bind(job_id)
        .bind(FusionJobStatus::Cancelled.id())
        .bind(ACTIVE_STATUSES[0])
        .bind(ACTIVE_STATUSES[1])
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a job by its ID, excluding soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FusionJob>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM fusion_jobs WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, FusionJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List jobs with optional status filter and pagination, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &FusionJobListQuery,
    ) -> Result<Vec<FusionJob>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = match params.status_id {
            Some(_) => format!(
                "SELECT {COLUMNS} FROM fusion_jobs \
                 WHERE deleted_at IS NULL AND status_id = $1 \
                 ORDER BY submitted_at DESC, id DESC \
                 LIMIT $2 OFFSET $3"
            ),
            None => format!(
                "SELECT {COLUMNS} FROM fusion_jobs \
                 WHERE deleted_at IS NULL \
                 ORDER BY submitted_at DESC, id DESC \
                 LIMIT $1 OFFSET $2"
            ),
        };

        let mut q = sqlx::query_as::<_, FusionJob>(&query);
        if let Some(status_id) = params.status_id {
            q = q.bind(status_id);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// All non-deleted jobs still in `submitted` or `polling`, oldest first.
    ///
    /// Used at startup to resume polling after a restart.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<FusionJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fusion_jobs \
             WHERE deleted_at IS NULL AND status_id IN ($1, $2) \
             ORDER BY submitted_at ASC, id ASC"
        );
        sqlx::query_as::<_, FusionJob>(&query)
            .bind(ACTIVE_STATUSES[0])
            .bind(ACTIVE_STATUSES[1])
            .fetch_all(pool)
            .await
    }

    /// Soft-delete a job. Returns `false` if it was missing or already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fusion_jobs SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
