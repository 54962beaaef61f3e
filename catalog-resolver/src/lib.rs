//! Catalog resolver: turns a category path into a ranked list of document
//! descriptors by querying the vendor's library search and extracting the
//! result rows from its markup.

#![allow(clippy::missing_docs_in_private_items)]

pub mod parser;
pub mod query;

use std::time::Duration;

use common::{
    error::AppError, types::document::DocumentDescriptor, utils::config::AppConfig,
};
use tracing::{info, warn};
use url::Url;

pub use query::derive_search_query;

/// Catalog relevance ranking is preserved, but a category query can match
/// the whole product family; cap what one interaction returns.
const MAX_RESULTS: usize = 10;

/// Successful resolution: the derived query and search URL are returned to
/// the caller alongside the descriptors so the UI can link to the catalog.
#[derive(Debug, Clone)]
pub struct CatalogResolution {
    pub query: String,
    pub search_url: Url,
    pub products: Vec<DocumentDescriptor>,
}

#[derive(Clone)]
pub struct CatalogResolver {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl CatalogResolver {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            http,
            base_url: Url::parse(&config.catalog_base_url)?,
            timeout: Duration::from_secs(config.catalog_timeout_secs),
        })
    }

    /// Resolve a `"A > B > C"` category path to document descriptors.
    /// Zero matches is a successful, empty resolution. Not retried: the
    /// call is user-interactive and cheap to re-trigger.
    pub async fn resolve(&self, full_path: &str) -> Result<CatalogResolution, AppError> {
        let query = derive_search_query(full_path)?;
        let search_url = self.search_url(&query)?;

        info!(%query, %search_url, "Querying catalog");

        let response = self
            .http
            .get(search_url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("catalog request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "catalog returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("catalog body unreadable: {e}")))?;

        if body.trim().is_empty() {
            return Err(AppError::UpstreamFormat(
                "catalog returned an empty response body".to_string(),
            ));
        }

        let mut products = parser::extract_descriptors(&body, &search_url);
        if products.is_empty() {
            warn!(%query, "Catalog search produced no parseable results");
        }
        products.truncate(MAX_RESULTS);

        info!(%query, count = products.len(), "Catalog resolution complete");

        Ok(CatalogResolution {
            query,
            search_url,
            products,
        })
    }

    fn search_url(&self, query: &str) -> Result<Url, AppError> {
        let mut url = self.base_url.join("/r")?;
        url.query_pairs_mut()
            .append_pair("cid", "pscat")
            .append_pair("lang", "en")
            .append_pair("q", query);
        Ok(url)
    }
}
