//! File upload and state polling against the provider's files API.
//!
//! Uploads use the resumable protocol: a start request that returns an
//! upload session URL, then a single upload-and-finalize request with the
//! raw bytes. After upload the provider post-processes the file
//! asynchronously; `wait_until_active` turns that into a blocking
//! precondition so a returned file is immediately usable for generation.

use std::time::Duration;

use bytes::Bytes;
use common::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{classify_provider_error, CallKind};
use crate::GeminiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
}

/// Provider-side file resource as returned by upload and `files.get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFile {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub state: FileState,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Serialize)]
struct StartUploadRequest<'a> {
    file: FileMetadata<'a>,
}

#[derive(Serialize)]
struct FileMetadata<'a> {
    display_name: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: ProviderFile,
}

impl GeminiClient {
    /// Upload raw document bytes and return the provider file resource,
    /// which may still be in the `Processing` state.
    pub async fn upload_file(
        &self,
        bytes: Bytes,
        display_name: &str,
        mime_type: &str,
        timeout: Duration,
    ) -> Result<ProviderFile, AppError> {
        let session_url = self
            .start_upload(display_name, mime_type, bytes.len(), timeout)
            .await?;

        debug!(%session_url, bytes = bytes.len(), "Opened resumable upload session");

        let response = self
            .http
            .post(&session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .timeout(timeout)
            .body(bytes)
            .send()
            .await
            .map_err(map_upload_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_provider_error(status, &body, CallKind::Upload));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::UploadRejected(format!("malformed upload response: {e}")))?;

        info!(
            file = %uploaded.file.name,
            state = ?uploaded.file.state,
            "Uploaded document to provider"
        );

        Ok(uploaded.file)
    }

    async fn start_upload(
        &self,
        display_name: &str,
        mime_type: &str,
        content_length: usize,
        timeout: Duration,
    ) -> Result<String, AppError> {
        let response = self
            .authed(self.http.post(format!("{}/upload/v1beta/files", self.base_url)))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", content_length)
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .timeout(timeout)
            .json(&StartUploadRequest {
                file: FileMetadata { display_name },
            })
            .send()
            .await
            .map_err(map_upload_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_provider_error(status, &body, CallKind::Upload));
        }

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                AppError::UploadRejected(
                    "provider did not return an upload session URL".to_string(),
                )
            })
    }

    /// Fetch the current state of an uploaded file by its provider name
    /// (e.g. `files/abc123`).
    pub async fn get_file(&self, name: &str) -> Result<ProviderFile, AppError> {
        let response = self
            .authed(
                self.http
                    .get(format!("{}/v1beta/{}", self.base_url, name)),
            )
            .timeout(self.chat_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_provider_error(status, &body, CallKind::FileGet));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UploadRejected(format!("malformed file resource: {e}")))
    }

    /// Poll until the file leaves `Processing`, bounded by `deadline`.
    /// Success means the file is usable for generation right now.
    pub async fn wait_until_active(
        &self,
        file: ProviderFile,
        poll_interval: Duration,
        deadline: Duration,
    ) -> Result<ProviderFile, AppError> {
        let started = tokio::time::Instant::now();
        let mut current = file;

        while current.state == FileState::Processing {
            if started.elapsed() >= deadline {
                return Err(AppError::ProcessingTimeout(format!(
                    "file {} still processing after {}s",
                    current.name,
                    deadline.as_secs()
                )));
            }
            tokio::time::sleep(poll_interval).await;
            current = self.get_file(&current.name).await?;
            debug!(file = %current.name, state = ?current.state, "Polled file state");
        }

        if current.state == FileState::Active {
            Ok(current)
        } else {
            Err(AppError::UploadRejected(format!(
                "file {} ended in state {:?}",
                current.name, current.state
            )))
        }
    }
}

fn map_upload_transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::ProcessingTimeout(format!("upload timed out: {err}"))
    } else {
        AppError::Reqwest(err)
    }
}
