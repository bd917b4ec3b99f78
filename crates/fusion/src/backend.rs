//! The seam between orchestration and the external compute service.
//!
//! [`FaceFusion`](crate::runner::FaceFusion) and the poller only talk to a
//! [`FusionBackend`], so tests can substitute a scripted implementation for
//! the HTTP client.

use async_trait::async_trait;
use faceswap_core::upload::FaceSwapUpload;

use crate::api::{FusionApi, FusionApiError, QueryResponse};

#[async_trait]
pub trait FusionBackend: Send + Sync {
    /// Submit a task and return its output-path token.
    async fn create_task(&self, upload: &FaceSwapUpload) -> Result<String, FusionApiError>;

    /// Issue one status query for a previously returned token.
    async fn query_task(&self, output_path: &str) -> Result<QueryResponse, FusionApiError>;
}

#[async_trait]
impl FusionBackend for FusionApi {
    async fn create_task(&self, upload: &FaceSwapUpload) -> Result<String, FusionApiError> {
        Ok(FusionApi::create_task(self, upload).await?.output_path)
    }

    async fn query_task(&self, output_path: &str) -> Result<QueryResponse, FusionApiError> {
        FusionApi::query_task(self, output_path).await
    }
}
