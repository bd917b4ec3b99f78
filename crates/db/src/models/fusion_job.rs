//! Fusion job entity and DTOs.

use faceswap_core::fusion_state::FusionState;
use faceswap_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{FusionJobStatus, StatusId};

/// A row from the `fusion_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FusionJob {
    pub id: DbId,
    pub status_id: StatusId,
    pub source_file_name: String,
    pub target_file_name: String,
    /// Opaque token returned by the external create endpoint.
    pub output_path: Option<String>,
    /// Name of the stored artifact inside the public output directory.
    pub output_filename: Option<String>,
    pub output_content_type: Option<String>,
    /// Terminal status code reported by the external query endpoint.
    pub upstream_status: Option<i16>,
    pub error_message: Option<String>,
    pub error_details: Option<serde_json::Value>,
    pub poll_attempts: i32,
    pub submitted_at: Timestamp,
    pub polling_started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    #[serde(skip)]
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FusionJob {
    /// Domain state for this row. Unknown status IDs are reported as failed.
    pub fn state(&self) -> FusionState {
        FusionJobStatus::from_id(self.status_id)
            .map(FusionState::from)
            .unwrap_or(FusionState::Failed)
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }
}

/// DTO for inserting a new job before the create call is made.
#[derive(Debug, Clone)]
pub struct CreateFusionJob {
    pub source_file_name: String,
    pub target_file_name: String,
}

/// Outcome written when a job finishes successfully.
#[derive(Debug, Clone)]
pub struct CompleteFusionJob {
    pub output_filename: String,
    pub output_content_type: Option<String>,
    pub poll_attempts: i32,
}

/// Outcome written when a job fails.
#[derive(Debug, Clone)]
pub struct FailFusionJob {
    pub error_message: String,
    pub upstream_status: Option<i16>,
    pub error_details: Option<serde_json::Value>,
    pub poll_attempts: i32,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct FusionJobListQuery {
    /// Filter by status ID (e.g. 2 = polling, 4 = failed).
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
