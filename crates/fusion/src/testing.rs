//! Scripted [`FusionBackend`] used by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use faceswap_core::upload::{FaceSwapUpload, UploadedFile};
use tokio::time::Instant;

use crate::api::{FusionApiError, QueryResponse};
use crate::backend::FusionBackend;

/// Replays queued query responses in order and records when each query
/// happened. Once the script runs dry every further query reports 202.
#[derive(Default)]
pub struct ScriptedBackend {
    create_result: Mutex<Option<Result<String, FusionApiError>>>,
    queries: Mutex<VecDeque<Result<QueryResponse, FusionApiError>>>,
    query_times: Mutex<Vec<Instant>>,
    creates: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, token: &str) -> Self {
        *self.create_result.lock().unwrap() = Some(Ok(token.to_string()));
        self
    }

    pub fn with_create_error(self, err: FusionApiError) -> Self {
        *self.create_result.lock().unwrap() = Some(Err(err));
        self
    }

    pub fn pending(self, count: usize) -> Self {
        for _ in 0..count {
            self.queries.lock().unwrap().push_back(Ok(status(202)));
        }
        self
    }

    pub fn then(self, result: Result<QueryResponse, FusionApiError>) -> Self {
        self.queries.lock().unwrap().push_back(result);
        self
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_times.lock().unwrap().len()
    }

    pub fn query_times(&self) -> Vec<Instant> {
        self.query_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl FusionBackend for ScriptedBackend {
    async fn create_task(&self, _upload: &FaceSwapUpload) -> Result<String, FusionApiError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.create_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok("outputs/task.bin".to_string()))
    }

    async fn query_task(&self, _output_path: &str) -> Result<QueryResponse, FusionApiError> {
        self.query_times.lock().unwrap().push(Instant::now());
        self.queries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status(202)))
    }
}

/// A body-less response with the given status.
pub fn status(code: u16) -> QueryResponse {
    QueryResponse {
        status: code,
        content_type: Some("application/json".to_string()),
        body: br#"{"status":"processing"}"#.to_vec(),
    }
}

/// A completed response carrying `body` as `content_type`.
pub fn artifact(content_type: &str, body: &[u8]) -> QueryResponse {
    QueryResponse {
        status: 200,
        content_type: Some(content_type.to_string()),
        body: body.to_vec(),
    }
}

/// A terminal failure response with a JSON error body.
pub fn rejection(code: u16, message: &str) -> QueryResponse {
    QueryResponse {
        status: code,
        content_type: Some("application/json".to_string()),
        body: serde_json::to_vec(&serde_json::json!({ "error": message })).unwrap(),
    }
}

/// A real transport-level error, produced without touching the network.
pub async fn transport_error() -> FusionApiError {
    let err = reqwest::Client::new()
        .post("not a url")
        .send()
        .await
        .unwrap_err();
    FusionApiError::Request(err)
}

pub fn upload() -> FaceSwapUpload {
    FaceSwapUpload {
        source: UploadedFile {
            file_name: "face.png".to_string(),
            content_type: Some("image/png".to_string()),
            data: b"face".to_vec(),
        },
        target: UploadedFile {
            file_name: "clip.mp4".to_string(),
            content_type: Some("video/mp4".to_string()),
            data: b"clip".to_vec(),
        },
    }
}
