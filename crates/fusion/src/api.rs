//! REST client for the face-fusion compute endpoints.
//!
//! Wraps the two endpoints of the external service using [`reqwest`]:
//! multipart task creation and JSON status queries.

use faceswap_core::query_status::{self, QueryDisposition};
use faceswap_core::upload::{FaceSwapUpload, UploadedFile, SOURCE_FIELD, TARGET_FIELD};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::FusionConfig;

/// HTTP client for a single face-fusion service.
pub struct FusionApi {
    client: reqwest::Client,
    create_url: String,
    query_url: String,
}

/// Response returned by the create endpoint after accepting a task.
#[derive(Debug, Deserialize)]
pub struct CreateTaskResponse {
    /// Opaque token identifying where the result will be retrievable.
    pub output_path: String,
}

/// Raw response of a single status query.
///
/// Every status code is returned as-is; interpretation is left to
/// [`QueryResponse::disposition`].
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl QueryResponse {
    pub fn disposition(&self) -> QueryDisposition {
        query_status::classify(self.status)
    }

    /// The body parsed as JSON, or as a JSON string when it is not JSON.
    ///
    /// Used for terminal failure responses, which the service sends as
    /// JSON error objects.
    pub fn error_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&self.body).into_owned())
        })
    }
}

/// Errors from the face-fusion REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum FusionApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The create endpoint returned a non-2xx status code.
    #[error("Fusion API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl FusionApi {
    /// Create a new API client.
    ///
    /// * `create_url` - task-creation endpoint, e.g. `http://host:8000/create_task`.
    /// * `query_url`  - status endpoint, e.g. `http://host:8000/query_task`.
    pub fn new(create_url: String, query_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), create_url, query_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, create_url: String, query_url: String) -> Self {
        Self {
            client,
            create_url,
            query_url,
        }
    }

    pub fn from_config(config: &FusionConfig) -> Self {
        Self::new(config.create_url.clone(), config.query_url.clone())
    }

    /// Submit a face-swap task.
    ///
    /// Sends a multipart `POST` with `source` and `target` file parts and
    /// returns the `output_path` token from the JSON response.
    pub async fn create_task(
        &self,
        upload: &FaceSwapUpload,
    ) -> Result<CreateTaskResponse, FusionApiError> {
        let form = Form::new()
            .part(SOURCE_FIELD, file_part(&upload.source)?)
            .part(TARGET_FIELD, file_part(&upload.target)?);

        let response = self
            .client
            .post(&self.create_url)
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Query the status of a task.
    ///
    /// Sends `POST {"output_path": ...}` and returns the status, content
    /// type and body without interpreting them. Only transport failures
    /// are reported as errors.
    pub async fn query_task(&self, output_path: &str) -> Result<QueryResponse, FusionApiError> {
        let body = serde_json::json!({ "output_path": output_path });

        let response = self.client.post(&self.query_url).json(&body).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(QueryResponse {
            status,
            content_type,
            body,
        })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`FusionApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, FusionApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FusionApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, FusionApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Build a multipart file part, forwarding the client's file name and
/// content type.
fn file_part(file: &UploadedFile) -> Result<Part, FusionApiError> {
    let part = Part::bytes(file.data.clone()).file_name(file.file_name.clone());
    match &file.content_type {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}
