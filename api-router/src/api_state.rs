use catalog_resolver::CatalogResolver;
use common::{error::AppError, utils::config::AppConfig};
use gemini_client::GeminiClient;
use ingestion_pipeline::IngestionCoordinator;
use query_pipeline::QueryResponder;

/// Shared, immutable per-process state. Each request clones cheap handles
/// out of this; invocations never share mutable state.
#[derive(Clone)]
pub struct ApiState {
    pub catalog: CatalogResolver,
    pub ingestion: IngestionCoordinator,
    pub query: QueryResponder,
    pub config: AppConfig,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().build()?;
        let gemini = GeminiClient::new(http.clone(), config)?;

        Ok(Self {
            catalog: CatalogResolver::new(http.clone(), config)?,
            ingestion: IngestionCoordinator::new(http, gemini.clone(), config),
            query: QueryResponder::new(gemini),
            config: config.clone(),
        })
    }
}
