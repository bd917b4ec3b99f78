use std::path::PathBuf;
use std::time::Duration;

use crate::poller::{PollPolicy, DEFAULT_POLL_INTERVAL};

/// Connection and polling settings for the face-fusion compute service.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Multipart task-creation endpoint.
    pub create_url: String,
    /// JSON status/query endpoint.
    pub query_url: String,
    /// Delay between two status queries.
    pub poll_interval: Duration,
    /// Upper bound on status queries. `None` polls until a terminal status.
    pub max_poll_attempts: Option<u32>,
    /// Directory that receives finished artifacts.
    pub output_dir: PathBuf,
}

impl FusionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                        |
    /// |------------------------------|--------------------------------|
    /// | `FUSION_API_URL`             | `http://localhost:8000`        |
    /// | `FUSION_CREATE_URL`          | `{FUSION_API_URL}/create_task` |
    /// | `FUSION_QUERY_URL`           | `{FUSION_API_URL}/query_task`  |
    /// | `FUSION_POLL_INTERVAL_SECS`  | `5`                            |
    /// | `FUSION_MAX_POLL_ATTEMPTS`   | unset (unbounded)              |
    /// | `FUSION_OUTPUT_DIR`          | `public/outputs`               |
    pub fn from_env() -> Self {
        let base = std::env::var("FUSION_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into())
            .trim_end_matches('/')
            .to_string();

        let create_url =
            std::env::var("FUSION_CREATE_URL").unwrap_or_else(|_| format!("{base}/create_task"));
        let query_url =
            std::env::var("FUSION_QUERY_URL").unwrap_or_else(|_| format!("{base}/query_task"));

        let poll_interval_secs: u64 = std::env::var("FUSION_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL.as_secs().to_string())
            .parse()
            .expect("FUSION_POLL_INTERVAL_SECS must be a valid u64");

        let max_poll_attempts = std::env::var("FUSION_MAX_POLL_ATTEMPTS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim()
                    .parse::<u32>()
                    .expect("FUSION_MAX_POLL_ATTEMPTS must be a valid u32")
            });

        let output_dir = std::env::var("FUSION_OUTPUT_DIR")
            .unwrap_or_else(|_| "public/outputs".into())
            .into();

        Self {
            create_url,
            query_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            max_poll_attempts,
            output_dir,
        }
    }

    /// Polling policy derived from this configuration.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_attempts: self.max_poll_attempts,
        }
    }
}
