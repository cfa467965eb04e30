//! Realty Plus scraper.
//!
//! The news listing frequently answers 403 to unfamiliar clients, so indexing
//! goes through [`get_with_forbidden_retry`]: up to three attempts with a fresh
//! user agent and a doubling delay between them.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument};
use url::Url;

use super::{Discovery, clean_text, fetch_page, prefix_base};
use crate::config::AppConfig;
use crate::http::{ForbiddenRetry, PageFetcher, get_with_forbidden_retry};

pub const LISTING_URL: &str = "https://www.rprealtyplus.com/news-views.html";
const SITE_URL: &str = "https://www.rprealtyplus.com/";
const ARTICLE_PREFIX: &str = "news-views";

static BASE_URL: Lazy<Url> = Lazy::new(|| Url::parse(SITE_URL).unwrap());
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "body > div.col-md-12.p-0 > div.container.mb-4.stry-mt.mob-p-0 > div > \
         div.col-md-8.rightSidebar.mob-p-0 > div > div > div:nth-child(4) > div",
    )
    .unwrap()
});

/// Collect up to `cap` unique article URLs whose href starts with `news-views`.
pub fn discover_urls(html: &str, cap: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&LINKS)
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| href.starts_with(ARTICLE_PREFIX))
        .filter_map(|href| prefix_base(&BASE_URL, href))
        .unique()
        .take(cap)
        .collect()
}

/// Cleaned article text from the story body container.
pub fn extract_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(&CONTENT).next()?;
    clean_text(&element.text().collect::<String>())
}

/// Fetch the Realty Plus news listing, retrying on 403, and collect its
/// article links.
///
/// # Returns
///
/// A [`Discovery`] with at most `realty_plus_discovery` URLs. When the
/// listing cannot be read, the URL list is empty and there is exactly one
/// error message.
#[instrument(level = "info", skip_all)]
pub async fn index_articles<F: PageFetcher>(fetcher: &F, config: &AppConfig) -> Discovery {
    let policy = ForbiddenRetry::from_config(config);

    match get_with_forbidden_retry(fetcher, LISTING_URL, &policy).await {
        Ok(html) => {
            let urls = discover_urls(&html, config.caps.realty_plus_discovery);
            info!(count = urls.len(), source = LISTING_URL, "Indexed Realty Plus article URLs");
            debug!(urls = ?urls, "Realty Plus URLs");
            Discovery::found(urls)
        }
        Err(e) if e.is_forbidden() => {
            error!(
                url = LISTING_URL,
                attempts = policy.max_attempts,
                error = %e,
                "Error scraping Realty Plus after retries"
            );
            Discovery::failed(format!(
                "Failed to scrape Realty Plus after {} attempts: {e}",
                policy.max_attempts
            ))
        }
        Err(e) => {
            error!(url = LISTING_URL, error = %e, "Error scraping Realty Plus");
            Discovery::failed(format!("Failed to scrape Realty Plus: {e}"))
        }
    }
}

#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_article<F: PageFetcher>(fetcher: &F, url: &str) -> Option<String> {
    let html = fetch_page(fetcher, url).await?;
    let text = extract_text(&html);
    match &text {
        Some(t) => debug!(bytes = t.len(), "Parsed Realty Plus article"),
        None => debug!("No content container found"),
    }
    text
}
