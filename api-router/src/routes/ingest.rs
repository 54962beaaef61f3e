use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct IngestParams {
    #[serde(default)]
    pub download_url: String,
}

/// Download a manual and ingest it with the AI provider. On success the
/// returned handle pair is what the caller echoes into every `/ask` call.
pub async fn ingest_manual(
    State(state): State<ApiState>,
    Json(input): Json<IngestParams>,
) -> Result<impl IntoResponse, ApiError> {
    if input.download_url.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "Missing download_url parameter".to_string(),
        ));
    }

    info!(download_url = %input.download_url, "Received ingest request");

    let handle = state.ingestion.ingest(&input.download_url).await?;

    Ok(Json(json!({
        "file_uri": handle.file_uri,
        "file_name": handle.file_id,
        "status": "success",
    })))
}
