use api_router::{api_routes_v1, api_state::ApiState};
use axum::{http::Method, Router};
use common::utils::config::get_config;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Build the shared operation state: one HTTP client, one provider
    // client, the three pipeline components
    let api_state = ApiState::new(&config)?;

    // The browser UI is served elsewhere; the API accepts any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    // Create Axum router
    let app = Router::new()
        .nest("/api/v1", api_routes_v1())
        .layer(cors)
        .with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use common::utils::config::AppConfig;
    use tower::ServiceExt;

    fn smoke_test_config() -> AppConfig {
        serde_json::from_value(serde_json::json!({
            "gemini_api_key": "test-key",
            "http_port": 0
        }))
        .expect("smoke test config")
    }

    fn smoke_test_app() -> Router {
        let api_state = ApiState::new(&smoke_test_config()).expect("api state");
        Router::new()
            .nest("/api/v1", api_routes_v1())
            .with_state(api_state)
    }

    #[tokio::test]
    async fn smoke_startup_and_probes() {
        let app = smoke_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/live")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let ready_response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("ready response");
        assert_eq!(ready_response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ask_with_empty_message_is_rejected_up_front() {
        let app = smoke_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/ask")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "user_message": "",
                            "file_uri": "https://provider.example/v1beta/files/abc",
                            "file_name": "files/abc"
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
