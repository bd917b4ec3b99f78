//! End-to-end face fusion: submit, poll, store.
//!
//! [`FaceFusion`] is constructed once from a [`FusionConfig`] and shared
//! between request handlers and background job workers.

use std::sync::Arc;

use faceswap_core::error::CoreError;
use faceswap_core::fusion_state::FusionState;
use faceswap_core::upload::FaceSwapUpload;
use tokio_util::sync::CancellationToken;

use crate::api::{FusionApi, FusionApiError};
use crate::backend::FusionBackend;
use crate::config::FusionConfig;
use crate::poller::{self, PollError, PollOutcome, PollPolicy};
use crate::storage::ArtifactStore;

/// Terminal result of a fusion task that did not error.
#[derive(Debug, Clone)]
pub enum FusionOutcome {
    /// The artifact was written to the output directory.
    Stored {
        filename: String,
        content_type: Option<String>,
        attempts: u32,
    },
    /// The service reported a terminal failure status.
    Rejected {
        status: u16,
        body: serde_json::Value,
        attempts: u32,
    },
}

impl FusionOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Stored { attempts, .. } | Self::Rejected { attempts, .. } => *attempts,
        }
    }

    pub fn state(&self) -> FusionState {
        match self {
            Self::Stored { .. } => FusionState::Succeeded,
            Self::Rejected { .. } => FusionState::Failed,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    /// The create call failed or returned a non-2xx status.
    #[error("task submission failed: {0}")]
    Submit(#[source] FusionApiError),

    #[error(transparent)]
    Poll(#[from] PollError),

    /// Writing the artifact to disk failed.
    #[error("failed to store artifact: {0}")]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    State(#[from] CoreError),
}

pub struct FaceFusion {
    backend: Arc<dyn FusionBackend>,
    store: ArtifactStore,
    policy: PollPolicy,
}

impl FaceFusion {
    pub fn new(backend: Arc<dyn FusionBackend>, store: ArtifactStore, policy: PollPolicy) -> Self {
        Self {
            backend,
            store,
            policy,
        }
    }

    /// Build a runner talking HTTP to the configured service.
    pub fn from_config(config: &FusionConfig) -> Self {
        Self::new(
            Arc::new(FusionApi::from_config(config)),
            ArtifactStore::new(config.output_dir.clone()),
            config.poll_policy(),
        )
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Submit both files and return the output-path token.
    pub async fn submit(&self, upload: &FaceSwapUpload) -> Result<String, FusionError> {
        let token = self
            .backend
            .create_task(upload)
            .await
            .map_err(FusionError::Submit)?;

        tracing::info!(
            output_path = %token,
            source = %upload.source.file_name,
            target = %upload.target.file_name,
            "Fusion task submitted",
        );
        Ok(token)
    }

    /// Poll a submitted task to completion and store its artifact.
    pub async fn await_result(
        &self,
        output_path: &str,
        cancel: &CancellationToken,
    ) -> Result<FusionOutcome, FusionError> {
        let report =
            poller::poll_until_terminal(self.backend.as_ref(), output_path, &self.policy, cancel)
                .await?;

        match report.outcome {
            PollOutcome::Completed(artifact) => {
                let stored = self.store.save(&artifact).await?;
                Ok(FusionOutcome::Stored {
                    filename: stored.filename,
                    content_type: artifact.content_type,
                    attempts: report.attempts,
                })
            }
            PollOutcome::Rejected { status, body } => Ok(FusionOutcome::Rejected {
                status,
                body,
                attempts: report.attempts,
            }),
        }
    }

    /// Run a whole task within the caller's lifetime.
    pub async fn run(
        &self,
        upload: &FaceSwapUpload,
        cancel: &CancellationToken,
    ) -> Result<FusionOutcome, FusionError> {
        let mut state = FusionState::Submitted;

        let token = match self.submit(upload).await {
            Ok(token) => token,
            Err(e) => {
                advance(&mut state, FusionState::Failed, "")?;
                return Err(e);
            }
        };
        advance(&mut state, FusionState::Polling, &token)?;

        let result = self.await_result(&token, cancel).await;
        let next = match &result {
            Ok(outcome) => outcome.state(),
            Err(FusionError::Poll(PollError::Cancelled { .. })) => FusionState::Cancelled,
            Err(_) => FusionState::Failed,
        };
        advance(&mut state, next, &token)?;

        result
    }
}

fn advance(state: &mut FusionState, next: FusionState, output_path: &str) -> Result<(), CoreError> {
    *state = state.transition(next)?;
    tracing::debug!(output_path, state = %state, "Fusion state changed");
    Ok(())
}
