use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use routes::{
    ask::ask_question, ingest::ingest_manual, liveness::live, readiness::ready,
    resolve::resolve_products,
};

use api_state::ApiState;

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        // Public probes (for k8s/systemd)
        .route("/live", get(live))
        .route("/ready", get(ready))
        // Pipeline operations; no caller auth, the trust boundary is the
        // server-held provider credential
        .route("/resolve", post(resolve_products))
        .route("/ingest", post(ingest_manual))
        .route("/ask", post(ask_question))
}
