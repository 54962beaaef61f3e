
use axum::http::StatusCode;
use serde_json::json;
use test_utils::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_RESULTS_PAGE: &str = r#"
<html><body>
  <div class="results">
    <a href="/Download.aspx?DocumentID=3BHS123456">High Power Rectifiers for primary aluminum smelting</a>
    <a href="/Download.aspx?DocumentID=3BHS654321">HPR commissioning checklist</a>
    <a href="/about">About the library</a>
  </div>
</body></html>
"#;

#[tokio::test]
async fn resolve_category_path_end_to_end() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r"))
        .and(query_param("cid", "pscat"))
        .and(query_param("q", "HPR"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESULTS_PAGE))
        .expect(1)
        .mount(&catalog)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/resolve")
        .json(&json!({ "full_path": "ABB Products > HPR" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["query"], "HPR");
    assert!(body["search_url"].as_str().unwrap().contains("q=HPR"));

    let products = body["products"].as_array().expect("products array");
    assert_eq!(products.len(), 2);
    assert_eq!(
        products[0]["title"],
        "High Power Rectifiers for primary aluminum smelting"
    );
    assert!(products[0]["download_url"]
        .as_str()
        .unwrap()
        .contains("DocumentID=3BHS123456"));
}

#[tokio::test]
async fn resolve_with_no_matches_returns_empty_list() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No results found.</p></body></html>"),
        )
        .mount(&catalog)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/resolve")
        .json(&json!({ "full_path": "ABB Products > Nonexistent" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["products"].as_array().expect("products array").len(), 0);
}

#[tokio::test]
async fn resolve_with_empty_path_is_rejected_before_any_request() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server.post("/api/v1/resolve").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("full_path"));

    let requests = catalog.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn resolve_when_catalog_is_down_is_an_upstream_error() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&catalog)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/resolve")
        .json(&json!({ "full_path": "ABB Products > HPR" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn ingest_then_ask_round_trip() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    mount_document(&catalog).await;
    mount_provider_upload(&provider).await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Section 4 covers maintenance." }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(2)
        .mount(&provider)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));

    let ingest_response = server
        .post("/api/v1/ingest")
        .json(&json!({ "download_url": format!("{}/docs/manual.pdf", catalog.uri()) }))
        .await;

    assert_eq!(ingest_response.status_code(), StatusCode::OK);
    let ingested: serde_json::Value = ingest_response.json();
    assert_eq!(ingested["status"], "success");
    assert_eq!(ingested["file_name"], "files/manual-1");
    let file_uri = ingested["file_uri"].as_str().expect("file_uri").to_string();
    let file_name = ingested["file_name"].as_str().expect("file_name").to_string();

    // The handle is reusable: asking twice works without re-ingesting.
    for _ in 0..2 {
        let ask_response = server
            .post("/api/v1/ask")
            .json(&json!({
                "user_message": "Where is maintenance covered?",
                "file_uri": file_uri,
                "file_name": file_name,
            }))
            .await;

        assert_eq!(ask_response.status_code(), StatusCode::OK);
        let answered: serde_json::Value = ask_response.json();
        assert_eq!(answered["status"], "success");
        assert_eq!(answered["response"], "Section 4 covers maintenance.");
    }
}

#[tokio::test]
async fn ingest_missing_document_is_an_upstream_failure() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&catalog)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/ingest")
        .json(&json!({ "download_url": format!("{}/docs/gone.pdf", catalog.uri()) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().is_some());
    assert!(body.get("file_uri").is_none());

    // Nothing was sent to the provider for a document that never arrived.
    let provider_requests = provider.received_requests().await.unwrap_or_default();
    assert!(provider_requests.is_empty());
}

#[tokio::test]
async fn ingest_with_empty_url_is_rejected() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/ingest")
        .json(&json!({ "download_url": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn ask_with_stale_handle_is_distinguishable_from_auth_failure() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "You do not have permission to access the File expired-1 or it may not exist.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&provider)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/ask")
        .json(&json!({
            "user_message": "Is anyone there?",
            "file_uri": "https://provider.example/v1beta/files/expired-1",
            "file_name": "files/expired-1",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("Stale file handle"));
}

#[tokio::test]
async fn ask_with_bad_credentials_reports_an_auth_error() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": 401,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "UNAUTHENTICATED"
            }
        })))
        .mount(&provider)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/ask")
        .json(&json!({
            "user_message": "Is anyone there?",
            "file_uri": "https://provider.example/v1beta/files/manual-1",
            "file_name": "files/manual-1",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("auth"));
}

#[tokio::test]
async fn ask_with_empty_message_never_reaches_the_provider() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/ask")
        .json(&json!({
            "user_message": "   ",
            "file_uri": "https://provider.example/v1beta/files/manual-1",
            "file_name": "files/manual-1",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");

    let provider_requests = provider.received_requests().await.unwrap_or_default();
    assert!(provider_requests.is_empty());
}

#[tokio::test]
async fn blocked_generation_surfaces_as_no_answer() {
    let catalog = MockServer::start().await;
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&provider)
        .await;

    let server = test_server(&test_config(&catalog.uri(), &provider.uri()));
    let response = server
        .post("/api/v1/ask")
        .json(&json!({
            "user_message": "Tell me about the manual.",
            "file_uri": "https://provider.example/v1beta/files/manual-1",
            "file_name": "files/manual-1",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "no_answer");
    assert_eq!(body["reason"], "SAFETY");
}
