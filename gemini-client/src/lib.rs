//! REST client for the Gemini file and generation APIs.
//!
//! Covers the three provider calls the service needs: resumable file
//! upload, file-state polling, and single-turn `generateContent`. The
//! credential is injected at construction and sent as a request header,
//! never read from ambient state.

#![allow(clippy::missing_docs_in_private_items)]

pub mod classify;
pub mod files;
pub mod generate;

use std::time::Duration;

use common::{error::AppError, utils::config::AppConfig};

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    chat_timeout: Duration,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Result<Self, AppError> {
        if config.gemini_api_key.trim().is_empty() {
            return Err(AppError::UpstreamAuth(
                "Gemini API key not configured".to_string(),
            ));
        }

        Ok(Self {
            http,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header("x-goog-api-key", &self.api_key)
    }
}
