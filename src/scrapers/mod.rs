//! News source scrapers.
//!
//! Each source module follows the same two-phase pattern:
//!
//! 1. **Indexing**: `index_articles()` discovers candidate article URLs from a
//!    listing page or feed and returns a [`Discovery`]
//! 2. **Fetching**: `fetch_article()` downloads one article and returns its
//!    cleaned text, or `None` when the page failed or had no content
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Discovery cap |
//! |--------|--------|--------|---------------|
//! | Construction World | [`construction_world`] | Homepage HTML | 25 |
//! | Economic Times Realty | [`economic_times`] | RSS `<guid>` values | feed size |
//! | Realty Plus | [`realty_plus`] | Listing HTML, 403 retry | 6 |
//!
//! Failures never propagate out of this module: they are logged and turned
//! into empty results.

pub mod construction_world;
pub mod economic_times;
pub mod realty_plus;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;
use url::Url;

use crate::config::AppConfig;
use crate::http::PageFetcher;
use crate::models::Source;

static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\(\[\{\}\)\]]").unwrap());

/// Outcome of indexing one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Candidate article URLs, unique, in discovery order.
    pub urls: Vec<String>,
    /// User-facing message when the listing could not be read.
    pub error: Option<String>,
}

impl Discovery {
    pub fn found(urls: Vec<String>) -> Self {
        Self { urls, error: None }
    }

    pub fn failed(message: String) -> Self {
        Self {
            urls: Vec::new(),
            error: Some(message),
        }
    }
}

/// Strip newlines and bracket characters, then trim.
///
/// Returns `None` when nothing is left.
pub fn clean_text(text: &str) -> Option<String> {
    let without_newlines = text.replace('\n', "");
    let cleaned = BRACKETS.replace_all(&without_newlines, "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Make `href` absolute by prefixing `base` unless it already carries an
/// `http` scheme.
pub(crate) fn prefix_base(base: &Url, href: &str) -> Option<String> {
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    base.join(href.trim_start_matches('/'))
        .ok()
        .map(|u| u.to_string())
}

/// Fetch a page body, logging and discarding any failure.
pub(crate) async fn fetch_page<F: PageFetcher>(fetcher: &F, url: &str) -> Option<String> {
    match fetcher.get(url).await {
        Ok(body) => Some(body),
        Err(e) => {
            error!(%url, error = %e, "Error fetching content");
            None
        }
    }
}

/// Index `source` using its discoverer.
pub async fn discover<F: PageFetcher>(source: Source, fetcher: &F, config: &AppConfig) -> Discovery {
    match source {
        Source::ConstructionWorld => construction_world::index_articles(fetcher, config).await,
        Source::EconomicTimesRealty => economic_times::index_articles(fetcher).await,
        Source::RealtyPlus => realty_plus::index_articles(fetcher, config).await,
    }
}

/// Fetch one article of `source` and return its cleaned text.
pub async fn extract<F: PageFetcher>(source: Source, fetcher: &F, url: &str) -> Option<String> {
    match source {
        Source::ConstructionWorld => construction_world::fetch_article(fetcher, url).await,
        Source::EconomicTimesRealty => economic_times::fetch_article(fetcher, url).await,
        Source::RealtyPlus => realty_plus::fetch_article(fetcher, url).await,
    }
}
