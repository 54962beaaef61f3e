use axum::{extract::State, response::IntoResponse, Json};
use common::types::file_handle::FileHandle;
use query_pipeline::QueryOutcome;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskParams {
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub file_uri: String,
    #[serde(default)]
    pub file_name: String,
}

/// Answer a question about a previously ingested manual. The handle
/// fields arrive exactly as `/ingest` returned them; they are passed
/// through opaquely.
pub async fn ask_question(
    State(state): State<ApiState>,
    Json(input): Json<AskParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        file_name = %input.file_name,
        message_chars = input.user_message.len(),
        "Received ask request"
    );

    let handle = FileHandle {
        file_id: input.file_name,
        file_uri: input.file_uri,
    };

    let outcome = state.query.ask(&input.user_message, &handle).await?;

    Ok(match outcome {
        QueryOutcome::Answer(response) => Json(json!({
            "response": response,
            "status": "success",
        })),
        // Distinguishable from both success and failure: the provider
        // finished but declined to answer, so the caller shows a specific
        // message instead of an empty response or an error.
        QueryOutcome::NoAnswer { reason } => Json(json!({
            "status": "no_answer",
            "reason": reason,
        })),
    })
}
