//! Maps provider error responses onto the service failure taxonomy.
//!
//! The provider reports failures as `{"error": {"code", "message",
//! "status"}}`. The important distinction for callers is a stale file
//! handle (remedy: re-ingest) versus a credential problem (remedy: fix
//! configuration), so classification leans on the gRPC status string and
//! falls back on which call was being made.

use common::error::AppError;
use serde::Deserialize;

/// Which provider call produced the error. Drives the fallback mapping
/// when the status string alone is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Upload,
    FileGet,
    Generate,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorDetail {
    message: String,
    status: String,
}

/// Classify a non-success provider response into an `AppError`.
pub fn classify_provider_error(
    http_status: reqwest::StatusCode,
    body: &str,
    call: CallKind,
) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_default();

    let message = if detail.message.is_empty() {
        format!("provider returned HTTP {http_status}")
    } else {
        detail.message.clone()
    };

    let mentions_credential = {
        let lowered = detail.message.to_ascii_lowercase();
        lowered.contains("api key") || lowered.contains("credential")
    };
    let mentions_file = {
        let lowered = detail.message.to_ascii_lowercase();
        lowered.contains("file")
    };

    match detail.status.as_str() {
        "UNAUTHENTICATED" => AppError::UpstreamAuth(message),
        "NOT_FOUND" => match call {
            CallKind::FileGet | CallKind::Generate => AppError::StaleFileHandle(message),
            CallKind::Upload => AppError::UploadRejected(message),
        },
        "PERMISSION_DENIED" => {
            // Expired or foreign file resources surface as permission
            // errors, with a message naming the file.
            if mentions_credential {
                AppError::UpstreamAuth(message)
            } else if mentions_file || matches!(call, CallKind::FileGet | CallKind::Generate) {
                AppError::StaleFileHandle(message)
            } else {
                AppError::UpstreamAuth(message)
            }
        }
        "INVALID_ARGUMENT" => {
            if mentions_credential {
                AppError::UpstreamAuth(message)
            } else if mentions_file && call == CallKind::Generate {
                AppError::StaleFileHandle(message)
            } else {
                match call {
                    CallKind::Upload => AppError::UploadRejected(message),
                    _ => AppError::InternalError(message),
                }
            }
        }
        "RESOURCE_EXHAUSTED" => match call {
            CallKind::Upload | CallKind::FileGet => AppError::UploadRejected(message),
            CallKind::Generate => AppError::UpstreamUnavailable(message),
        },
        _ => match call {
            CallKind::Upload | CallKind::FileGet => AppError::UploadRejected(message),
            CallKind::Generate => AppError::UpstreamUnavailable(message),
        },
    }
}
