use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: the service has no storage of its own, so readiness
/// reduces to holding a provider credential.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    if state.config.gemini_api_key.trim().is_empty() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "provider_credential": "fail" }
            })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "provider_credential": "ok" }
            })),
        )
    }
}
