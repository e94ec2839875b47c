//! Discovery of the newest document id
//!
//! The landing page lists recent documents. The first link under the
//! "items_group" block is usually from the same day, which is close enough
//! to bound a full harvest.

use crate::QuireError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

const GROUP_SELECTOR: &str = r#"div[class*="items_group"]"#;
const LINK_SELECTOR: &str = r#"a[href^="/poem/"]"#;

static DOCUMENT_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/poem/(\d+)(?:-|$)").expect("document href pattern is valid"));

/// Parses the newest document id out of a landing page
///
/// Links look like `/poem/12345-some-title`; the leading integer is the id.
pub fn parse_latest_id(html: &str) -> Option<u64> {
    let document = Html::parse_document(html);
    let group_selector = Selector::parse(GROUP_SELECTOR).ok()?;
    let link_selector = Selector::parse(LINK_SELECTOR).ok()?;

    let group = document.select(&group_selector).next()?;
    let href = group.select(&link_selector).next()?.value().attr("href")?;

    DOCUMENT_HREF
        .captures(href)
        .and_then(|captures| captures.get(1))
        .and_then(|id| id.as_str().parse::<u64>().ok())
}

/// Fetches the landing page at `url` and returns the newest document id
pub async fn discover_latest_id(client: &Client, url: &str) -> Result<u64, QuireError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(QuireError::LatestId {
            url: url.to_string(),
            message: format!("HTTP {}", status.as_u16()),
        });
    }

    let body = response.text().await?;
    let latest = parse_latest_id(&body).ok_or_else(|| QuireError::LatestId {
        url: url.to_string(),
        message: "no document link found".to_string(),
    })?;

    tracing::info!("Newest document id on {}: {}", url, latest);
    Ok(latest)
}
