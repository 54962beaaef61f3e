//! Raw document retrieval from the external document store.
//!
//! The catalog's download locators sometimes point at an interstitial HTML
//! page that embeds the real document in an `iframe#mainFrame`; in that
//! case the iframe target is resolved and fetched in a second pass.

use std::net::IpAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use common::error::AppError;
use futures::StreamExt;
use mime::Mime;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

/// The document store rejects anonymous-looking clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct FetchedDocument {
    pub bytes: Bytes,
    pub media_type: Option<Mime>,
}

/// Validate a caller-supplied locator: http/https only, with a public
/// host unless `allow_local` is set. Returns the parsed URL.
pub fn ensure_locator_allowed(raw: &str, allow_local: bool) -> Result<Url, AppError> {
    let url = Url::parse(raw)
        .map_err(|_| AppError::Validation("Invalid download_url parameter".to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            warn!(%url, %scheme, "Rejected locator with unsupported scheme");
            return Err(AppError::Validation(
                "Unsupported URL scheme for ingestion".to_string(),
            ));
        }
    }

    let Some(host) = url.host_str() else {
        warn!(%url, "Rejected locator missing host");
        return Err(AppError::Validation(
            "URL is missing a host component".to_string(),
        ));
    };

    if allow_local {
        return Ok(url);
    }

    if host.eq_ignore_ascii_case("localhost") {
        warn!(%url, host, "Rejected locator pointing at localhost");
        return Err(AppError::Validation(
            "Ingestion URL host is not allowed".to_string(),
        ));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        let is_disallowed = match ip {
            IpAddr::V4(v4) => v4.is_private() || v4.is_link_local(),
            IpAddr::V6(v6) => v6.is_unique_local() || v6.is_unicast_link_local(),
        };

        if ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || is_disallowed {
            warn!(%url, host, %ip, "Rejected locator pointing at restricted network range");
            return Err(AppError::Validation(
                "Ingestion URL host is not allowed".to_string(),
            ));
        }
    }

    Ok(url)
}

/// Fetch the raw document bytes behind a locator, resolving at most one
/// interstitial HTML page. Transfer is bounded by `timeout` per request
/// and `max_bytes` total.
pub async fn fetch_document(
    http: &reqwest::Client,
    locator: &Url,
    timeout: Duration,
    max_bytes: usize,
) -> Result<FetchedDocument, AppError> {
    info!(%locator, "Fetching document");

    let first = fetch_once(http, locator.clone(), timeout, max_bytes).await?;

    if !is_html(first.media_type.as_ref()) {
        return Ok(first);
    }

    // Interstitial page: the real document URL sits in iframe#mainFrame.
    let markup = String::from_utf8_lossy(&first.bytes).into_owned();
    let target = iframe_target(&markup, locator).ok_or_else(|| {
        AppError::SourceFetch(
            "could not find a document URL in the download page".to_string(),
        )
    })?;

    info!(%target, "Resolved interstitial download page");

    let second = fetch_once(http, target, timeout, max_bytes).await?;
    if is_html(second.media_type.as_ref()) {
        return Err(AppError::SourceFetch(
            "download page resolved to another page, not a document".to_string(),
        ));
    }

    Ok(second)
}

async fn fetch_once(
    http: &reqwest::Client,
    url: Url,
    timeout: Duration,
    max_bytes: usize,
) -> Result<FetchedDocument, AppError> {
    let response = http
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AppError::SourceFetch(format!("document fetch timed out: {e}"))
            } else {
                AppError::SourceFetch(format!("document fetch failed: {e}"))
            }
        })?;

    if !response.status().is_success() {
        return Err(AppError::SourceFetch(format!(
            "document store returned HTTP {}",
            response.status()
        )));
    }

    // Fail fast on a declared oversize before buffering anything.
    if let Some(declared) = response.content_length() {
        if declared > max_bytes as u64 {
            return Err(AppError::PayloadTooLarge(format!(
                "document is {declared} bytes, limit is {max_bytes}"
            )));
        }
    }

    let media_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Mime>().ok());

    // Accumulate the body in bounded steps so an oversized or unlabeled
    // transfer never occupies more than `max_bytes` of memory.
    let mut body = BytesMut::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| AppError::SourceFetch(format!("document body unreadable: {e}")))?;
        if body.len().saturating_add(chunk.len()) > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "document exceeds the {max_bytes} byte limit"
            )));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(FetchedDocument {
        bytes: body.freeze(),
        media_type,
    })
}

fn is_html(media_type: Option<&Mime>) -> bool {
    media_type.is_some_and(|m| m.type_() == mime::TEXT && m.subtype() == mime::HTML)
}

fn iframe_target(markup: &str, base: &Url) -> Option<Url> {
    let document = Html::parse_document(markup);
    let selector = Selector::parse("iframe#mainFrame").ok()?;
    let src = document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("src"))?;
    base.join(src).ok()
}
