//! Background polling of persisted fusion jobs.
//!
//! A job is created and submitted inside its HTTP request; polling then
//! moves to a spawned task so the request can return immediately. Each
//! task owns a child of the registry's root [`CancellationToken`]:
//! cancelling a job cancels its child, shutting down cancels the root.
//!
//! A task interrupted by shutdown leaves its row in `polling`, and
//! [`resume_active`] picks it up again on the next start.

use std::collections::HashMap;
use std::sync::Arc;

use faceswap_core::types::DbId;
use faceswap_db::models::fusion_job::{CompleteFusionJob, FailFusionJob, FusionJob};
use faceswap_db::models::status::FusionJobStatus;
use faceswap_db::repositories::FusionJobRepo;
use faceswap_fusion::poller::PollError;
use faceswap_fusion::runner::{FaceFusion, FusionError, FusionOutcome};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Tracks the cancellation token of every running job poller.
pub struct JobRegistry {
    tasks: RwLock<HashMap<DbId, CancellationToken>>,
    root: CancellationToken,
}

impl JobRegistry {
    /// Create a registry whose pollers stop when `root` is cancelled.
    pub fn new(root: CancellationToken) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            root,
        }
    }

    /// Register a poller for `job_id` and return its token.
    pub async fn register(&self, job_id: DbId) -> CancellationToken {
        let token = self.root.child_token();
        self.tasks.write().await.insert(job_id, token.clone());
        token
    }

    /// Cancel the poller of `job_id`. Returns `false` if none was running.
    pub async fn cancel(&self, job_id: DbId) -> bool {
        match self.tasks.write().await.remove(&job_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Forget a poller that finished on its own.
    pub async fn finish(&self, job_id: DbId) {
        self.tasks.write().await.remove(&job_id);
    }

    pub async fn is_running(&self, job_id: DbId) -> bool {
        self.tasks.read().await.contains_key(&job_id)
    }

    pub async fn active_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

/// Move a submitted job to `polling` and start its poller.
///
/// The cancellation token is registered before the row changes state, so a
/// cancel request arriving at any point after this call reaches the poller.
/// Returns `None` (and spawns nothing) if the job is no longer `submitted`.
pub async fn start_polling(
    pool: &PgPool,
    fusion: &Arc<FaceFusion>,
    registry: &Arc<JobRegistry>,
    job_id: DbId,
    output_path: String,
) -> Result<Option<FusionJob>, sqlx::Error> {
    let cancel = registry.register(job_id).await;

    let job = match FusionJobRepo::mark_polling(pool, job_id, &output_path).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            registry.finish(job_id).await;
            return Ok(None);
        }
        Err(e) => {
            registry.finish(job_id).await;
            return Err(e);
        }
    };

    spawn_poller(
        pool.clone(),
        Arc::clone(fusion),
        Arc::clone(registry),
        job_id,
        output_path,
        cancel,
    );
    Ok(Some(job))
}

/// Spawn a poller for a `polling` job whose token is already registered.
pub fn spawn_poller(
    pool: PgPool,
    fusion: Arc<FaceFusion>,
    registry: Arc<JobRegistry>,
    job_id: DbId,
    output_path: String,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tracing::info!(job_id, output_path = %output_path, "Fusion job polling started");
        let result = fusion.await_result(&output_path, &cancel).await;
        record_outcome(&pool, &fusion, job_id, result).await;
        registry.finish(job_id).await;
    });
}

/// Resume pollers for jobs left unfinished by a previous run.
///
/// Jobs that never received an output token cannot be resumed and are
/// marked failed. Returns the number of pollers spawned.
pub async fn resume_active(
    pool: &PgPool,
    fusion: &Arc<FaceFusion>,
    registry: &Arc<JobRegistry>,
) -> Result<usize, sqlx::Error> {
    let mut resumed = 0;

    for job in FusionJobRepo::list_active(pool).await? {
        match resumable_token(&job) {
            Some(output_path) => {
                let cancel = registry.register(job.id).await;
                spawn_poller(
                    pool.clone(),
                    Arc::clone(fusion),
                    Arc::clone(registry),
                    job.id,
                    output_path,
                    cancel,
                );
                resumed += 1;
            }
            None => {
                tracing::warn!(job_id = job.id, "Fusion job interrupted before submission");
                FusionJobRepo::fail(
                    pool,
                    job.id,
                    &FailFusionJob {
                        error_message: "Interrupted before the task was submitted".to_string(),
                        upstream_status: None,
                        error_details: None,
                        poll_attempts: job.poll_attempts,
                    },
                )
                .await?;
            }
        }
    }

    Ok(resumed)
}

fn resumable_token(job: &FusionJob) -> Option<String> {
    if job.status_id == FusionJobStatus::Polling.id() {
        job.output_path.clone()
    } else {
        None
    }
}

/// Persist the terminal result of a poller.
///
/// An artifact stored for a job that was cancelled meanwhile is deleted.
async fn record_outcome(
    pool: &PgPool,
    fusion: &FaceFusion,
    job_id: DbId,
    result: Result<FusionOutcome, FusionError>,
) {
    let update = match result {
        Ok(FusionOutcome::Stored {
            filename,
            content_type,
            attempts,
        }) => {
            tracing::info!(job_id, filename = %filename, attempts, "Fusion job succeeded");
            let input = CompleteFusionJob {
                output_filename: filename,
                output_content_type: content_type,
                poll_attempts: clamp_attempts(attempts),
            };
            let update = FusionJobRepo::complete(pool, job_id, &input).await;
            if matches!(update, Ok(false)) {
                if let Err(e) = fusion.store().remove(&input.output_filename).await {
                    tracing::warn!(
                        job_id,
                        filename = %input.output_filename,
                        error = %e,
                        "Failed to delete orphaned artifact",
                    );
                }
            }
            update
        }
        Ok(FusionOutcome::Rejected {
            status,
            body,
            attempts,
        }) => {
            tracing::warn!(job_id, status, attempts, "Fusion job rejected upstream");
            let input = FailFusionJob {
                error_message: format!("Fusion task rejected with status {status}"),
                upstream_status: i16::try_from(status).ok(),
                error_details: Some(body),
                poll_attempts: clamp_attempts(attempts),
            };
            FusionJobRepo::fail(pool, job_id, &input).await
        }
        // Cancelled by the user (row already updated) or by shutdown (row
        // stays in `polling` for resumption).
        Err(FusionError::Poll(PollError::Cancelled { attempts })) => {
            tracing::info!(job_id, attempts, "Fusion job polling cancelled");
            return;
        }
        Err(err) => {
            let attempts = match &err {
                FusionError::Poll(poll) => poll.attempts(),
                _ => 0,
            };
            tracing::error!(job_id, error = %err, "Fusion job failed");
            let input = FailFusionJob {
                error_message: err.to_string(),
                upstream_status: None,
                error_details: None,
                poll_attempts: clamp_attempts(attempts),
            };
            FusionJobRepo::fail(pool, job_id, &input).await
        }
    };

    match update {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(job_id, "Fusion job already terminal, outcome discarded");
        }
        Err(e) => {
            tracing::error!(job_id, error = %e, "Failed to record fusion job outcome");
        }
    }
}

fn clamp_attempts(attempts: u32) -> i32 {
    i32::try_from(attempts).unwrap_or(i32::MAX)
}
