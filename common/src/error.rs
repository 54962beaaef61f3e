use thiserror::Error;

// Core internal errors. Every operation boundary converts these into the
// structured failure shape; nothing propagates as an unstructured fault.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Catalog unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Unexpected upstream format: {0}")]
    UpstreamFormat(String),
    #[error("Document fetch failed: {0}")]
    SourceFetch(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Upload rejected: {0}")]
    UploadRejected(String),
    #[error("Provider processing timed out: {0}")]
    ProcessingTimeout(String),
    #[error("Stale file handle: {0}")]
    StaleFileHandle(String),
    #[error("Provider auth error: {0}")]
    UpstreamAuth(String),
    #[error("Provider timeout: {0}")]
    UpstreamTimeout(String),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Url parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal service error: {0}")]
    InternalError(String),
}
