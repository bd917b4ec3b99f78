//! Fixed-interval polling of the status endpoint.
//!
//! The first query goes out immediately; after every non-terminal answer
//! the poller sleeps for [`PollPolicy::interval`] and queries again. There
//! is no backoff and, unless [`PollPolicy::max_attempts`] is set, no upper
//! bound. A transport error ends polling at once.

use std::time::Duration;

use faceswap_core::query_status::QueryDisposition;
use tokio_util::sync::CancellationToken;

use crate::api::FusionApiError;
use crate::backend::FusionBackend;

/// Delay between status queries when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

/// A finished artifact as returned by the query endpoint.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Terminal result of polling.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Status 200: the artifact is ready.
    Completed(Artifact),
    /// Status 400, 404 or 500: passed through to the caller.
    Rejected {
        status: u16,
        body: serde_json::Value,
    },
}

#[derive(Debug, Clone)]
pub struct PollReport {
    pub outcome: PollOutcome,
    /// Number of status queries issued, including the terminal one.
    pub attempts: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("status query {attempt} failed: {source}")]
    Transport {
        attempt: u32,
        #[source]
        source: FusionApiError,
    },

    #[error("polling cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("no terminal status after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

impl PollError {
    /// Status queries issued before polling stopped.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Transport { attempt, .. } => *attempt,
            Self::Cancelled { attempts } | Self::Exhausted { attempts } => *attempts,
        }
    }
}

/// Poll `output_path` until the service reports a terminal status.
pub async fn poll_until_terminal(
    backend: &dyn FusionBackend,
    output_path: &str,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<PollReport, PollError> {
    let mut attempts: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled { attempts });
        }

        attempts += 1;
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(PollError::Cancelled { attempts }),
            result = backend.query_task(output_path) => {
                result.map_err(|source| PollError::Transport { attempt: attempts, source })?
            }
        };

        match response.disposition() {
            QueryDisposition::Completed => {
                tracing::debug!(output_path, attempts, "Fusion result ready");
                return Ok(PollReport {
                    outcome: PollOutcome::Completed(Artifact {
                        content_type: response.content_type,
                        data: response.body,
                    }),
                    attempts,
                });
            }
            QueryDisposition::Rejected(status) => {
                tracing::debug!(output_path, attempts, status, "Fusion task rejected");
                return Ok(PollReport {
                    outcome: PollOutcome::Rejected {
                        status,
                        body: response.error_body(),
                    },
                    attempts,
                });
            }
            QueryDisposition::Pending => {
                tracing::debug!(
                    output_path,
                    attempt = attempts,
                    status = response.status,
                    "Fusion task still processing",
                );
            }
        }

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(PollError::Exhausted { attempts });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(PollError::Cancelled { attempts }),
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
}
