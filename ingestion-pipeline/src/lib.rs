//! Ingestion coordinator: fetches a document from the external store,
//! forwards it to the AI provider, and waits until the provider reports
//! the uploaded file as usable.
//!
//! Each invocation owns its byte buffer exclusively; the buffer moves into
//! the upload call and is gone when `ingest` returns, success or failure.
//! Nothing is retried here: a retry would double-consume the fetch/upload
//! budget inside one bounded invocation window, so retries belong to the
//! caller.

#![allow(clippy::missing_docs_in_private_items)]

pub mod fetch;

use std::time::Duration;

use common::{
    error::AppError,
    types::file_handle::FileHandle,
    utils::config::AppConfig,
};
use gemini_client::files::ProviderFile;
use gemini_client::GeminiClient;
use tracing::info;
use url::Url;

use fetch::{ensure_locator_allowed, fetch_document, FetchedDocument};

#[derive(Clone)]
pub struct IngestionCoordinator {
    http: reqwest::Client,
    gemini: GeminiClient,
    fetch_timeout: Duration,
    max_document_bytes: usize,
    allow_local_sources: bool,
    poll_interval: Duration,
    processing_timeout: Duration,
}

impl IngestionCoordinator {
    pub fn new(http: reqwest::Client, gemini: GeminiClient, config: &AppConfig) -> Self {
        Self {
            http,
            gemini,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            max_document_bytes: config.max_document_bytes,
            allow_local_sources: config.allow_local_sources,
            poll_interval: Duration::from_secs(config.processing_poll_secs),
            processing_timeout: Duration::from_secs(config.processing_timeout_secs),
        }
    }

    /// Ingest the document behind `download_url` and return a handle that
    /// is immediately usable for querying.
    pub async fn ingest(&self, download_url: &str) -> Result<FileHandle, AppError> {
        let locator = ensure_locator_allowed(download_url, self.allow_local_sources)?;

        let fetched = fetch_document(
            &self.http,
            &locator,
            self.fetch_timeout,
            self.max_document_bytes,
        )
        .await?;

        let mime_type = accepted_media_type(&fetched)?;
        let display_name = display_name_for(&locator);

        info!(
            %locator,
            bytes = fetched.bytes.len(),
            mime_type,
            display_name,
            "Uploading document to provider"
        );

        let uploaded = self
            .gemini
            .upload_file(fetched.bytes, &display_name, mime_type, self.fetch_timeout)
            .await?;

        let active = self
            .gemini
            .wait_until_active(uploaded, self.poll_interval, self.processing_timeout)
            .await?;

        Ok(handle_for(active))
    }
}

fn handle_for(file: ProviderFile) -> FileHandle {
    FileHandle {
        file_id: file.name,
        file_uri: file.uri,
    }
}

/// Check the fetched payload against the accepted document types and pick
/// the media type to declare on upload. The store frequently labels PDFs
/// as `application/octet-stream`, so the `%PDF` magic counts too.
fn accepted_media_type(fetched: &FetchedDocument) -> Result<&'static str, AppError> {
    if fetched.bytes.is_empty() {
        return Err(AppError::SourceFetch(
            "fetched document is empty".to_string(),
        ));
    }

    let looks_like_pdf = fetched.bytes.starts_with(b"%PDF");
    let declared_pdf = fetched
        .media_type
        .as_ref()
        .is_some_and(|m| m.type_() == mime::APPLICATION && m.subtype() == mime::PDF);

    if declared_pdf || looks_like_pdf {
        return Ok("application/pdf");
    }

    let declared = fetched
        .media_type
        .as_ref()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    Err(AppError::SourceFetch(format!(
        "unsupported document media type: {declared}"
    )))
}

/// Display name shown in the provider's file listing, derived from the
/// locator: the catalog's DocumentID when present, else the last path
/// segment.
fn display_name_for(locator: &Url) -> String {
    let document_id = locator
        .query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case("documentid"))
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty());

    if let Some(id) = document_id {
        return format!("{id}.pdf");
    }

    locator
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map_or_else(|| "document.pdf".to_string(), ToString::to_string)
}
