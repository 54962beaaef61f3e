use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub http_port: u16,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
    /// Permits loopback and private-range document hosts. Off outside of
    /// local development.
    #[serde(default)]
    pub allow_local_sources: bool,
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,
    #[serde(default = "default_processing_poll_secs")]
    pub processing_poll_secs: u64,
    #[serde(default = "default_processing_timeout_secs")]
    pub processing_timeout_secs: u64,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_catalog_base_url() -> String {
    "https://library.abb.com".to_string()
}

fn default_max_document_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_catalog_timeout_secs() -> u64 {
    15
}

fn default_fetch_timeout_secs() -> u64 {
    60
}

fn default_chat_timeout_secs() -> u64 {
    60
}

fn default_processing_poll_secs() -> u64 {
    5
}

fn default_processing_timeout_secs() -> u64 {
    120
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
