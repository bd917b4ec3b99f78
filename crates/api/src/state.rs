use std::sync::Arc;

use faceswap_fusion::runner::FaceFusion;
use tokio_util::sync::CancellationToken;

use crate::background::fusion_jobs::JobRegistry;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: faceswap_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Face-fusion runner shared by request handlers and job workers.
    pub fusion: Arc<FaceFusion>,
    /// Cancellation handles of background pollers, keyed by job ID.
    pub jobs: Arc<JobRegistry>,
    /// Cancelled once when the server begins shutting down.
    pub shutdown: CancellationToken,
}
