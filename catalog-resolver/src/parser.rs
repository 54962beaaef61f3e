//! Best-effort extraction of document descriptors from catalog result
//! markup.
//!
//! The catalog page is not a contract; its layout drifts. All knowledge of
//! that layout is confined to this module, behind one narrow interface:
//! markup in, descriptors out. Extraction is row-local, so a single
//! malformed entry is skipped rather than failing the whole call.

use common::types::document::DocumentDescriptor;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Selector passes tried in order; the first pass with hits wins. The
/// leading passes match the download links the catalog currently renders,
/// the last is a coarse net for layout drift.
const ANCHOR_PASSES: [&str; 3] = [
    r#"a[href*="Download.aspx"]"#,
    r#"a[href*="DocumentID="]"#,
    r#"a[href$=".pdf"]"#,
];

/// Extract document descriptors from catalog result markup, resolving
/// relative hrefs against `base`. Catalog ordering is preserved and
/// duplicate titles are dropped.
pub fn extract_descriptors(markup: &str, base: &Url) -> Vec<DocumentDescriptor> {
    let document = Html::parse_document(markup);

    let mut descriptors = Vec::new();
    let mut seen_titles = HashSet::new();

    for pass in ANCHOR_PASSES {
        let Ok(selector) = Selector::parse(pass) else {
            continue;
        };

        for anchor in document.select(&selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(download_url) = base.join(href) else {
                debug!(href, "Skipping result row with unresolvable href");
                continue;
            };

            let title = anchor_title(&anchor);
            if title.is_empty() {
                debug!(href, "Skipping result row without a title");
                continue;
            }

            if seen_titles.insert(title.clone()) {
                descriptors.push(DocumentDescriptor {
                    title,
                    download_url,
                });
            }
        }

        if !descriptors.is_empty() {
            break;
        }
    }

    descriptors
}

/// Display title for a result anchor: visible text first, `title`
/// attribute as fallback for icon-only links.
fn anchor_title(anchor: &scraper::ElementRef<'_>) -> String {
    let text = anchor
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if !text.is_empty() {
        return text;
    }

    anchor
        .value()
        .attr("title")
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}
