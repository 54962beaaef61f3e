use serde::{Deserialize, Serialize};
use url::Url;

/// One catalog search hit: a display title plus the locator used to fetch
/// the raw document bytes. The locator is only ever consumed by the
/// ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub title: String,
    pub download_url: Url,
}
