use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    #[serde(default)]
    pub full_path: String,
}

/// Resolve a category path to the matching catalog documents.
pub async fn resolve_products(
    State(state): State<ApiState>,
    Json(input): Json<ResolveParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!(full_path = %input.full_path, "Received resolve request");

    let resolution = state.catalog.resolve(&input.full_path).await?;

    Ok(Json(json!({
        "products": resolution.products,
        "query": resolution.query,
        "search_url": resolution.search_url,
    })))
}
