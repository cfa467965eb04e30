//! Construction World scraper.
//!
//! Article links are taken from the homepage's sidebar blocks and its
//! three-column story grid. Article text lives in the page's mobile-banner
//! container under `#content`.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument};
use url::Url;

use super::{Discovery, clean_text, fetch_page, prefix_base};
use crate::config::AppConfig;
use crate::http::PageFetcher;

pub const HOMEPAGE_URL: &str = "https://www.constructionworld.in";

static BASE_URL: Lazy<Url> = Lazy::new(|| Url::parse(HOMEPAGE_URL).unwrap());
// Grid columns match on the exact class attribute, not on a superset of it.
static LINK_CONTAINERS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#".sidebg, [class="col-lg-4 col-md-12 col-sm-12 col-12"]"#).unwrap()
});
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#content > div > div.mobile-banner").unwrap());

/// Collect up to `cap` unique article URLs from homepage HTML.
pub fn discover_urls(html: &str, cap: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&LINK_CONTAINERS)
        .flat_map(|container| container.select(&LINKS))
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:"))
        .filter_map(|href| prefix_base(&BASE_URL, href))
        .unique()
        .take(cap)
        .collect()
}

/// Cleaned article text, or `None` when the content container is missing
/// or empty.
pub fn extract_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(&CONTENT).next()?;
    clean_text(&element.text().collect::<String>())
}

/// Fetch the Construction World homepage and collect its article links.
///
/// # Returns
///
/// A [`Discovery`] with at most `construction_world_discovery` unique URLs,
/// or a failed one with a user-facing message when the homepage fetch fails.
#[instrument(level = "info", skip_all)]
pub async fn index_articles<F: PageFetcher>(fetcher: &F, config: &AppConfig) -> Discovery {
    match fetcher.get(HOMEPAGE_URL).await {
        Ok(html) => {
            let urls = discover_urls(&html, config.caps.construction_world_discovery);
            info!(count = urls.len(), source = HOMEPAGE_URL, "Indexed Construction World article URLs");
            debug!(urls = ?urls, "Construction World URLs");
            Discovery::found(urls)
        }
        Err(e) => {
            error!(url = HOMEPAGE_URL, error = %e, "Error scraping Construction World");
            Discovery::failed(format!("Failed to scrape Construction World: {e}"))
        }
    }
}

#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_article<F: PageFetcher>(fetcher: &F, url: &str) -> Option<String> {
    let html = fetch_page(fetcher, url).await?;
    let text = extract_text(&html);
    match &text {
        Some(t) => debug!(bytes = t.len(), "Parsed Construction World article"),
        None => debug!("No content container found"),
    }
    text
}
