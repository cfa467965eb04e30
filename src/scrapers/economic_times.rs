//! Economic Times Realty scraper.
//!
//! Article URLs come from the `recentstories` RSS feed, one per item
//! `<guid>`. Article pages carry no stable content container, so the whole
//! page text is used.

use itertools::Itertools;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use scraper::Html;
use tracing::{debug, error, info, instrument, warn};

use super::{Discovery, clean_text, fetch_page};
use crate::http::PageFetcher;

pub const FEED_URL: &str = "https://realty.economictimes.indiatimes.com/rss/recentstories";

/// Every non-empty `<guid>` in document order, deduplicated.
///
/// The feed is streamed rather than deserialized, so guids are found
/// wherever they sit and the rest of the document is never validated:
/// HTML entities such as `&nbsp;`, bare ampersands, mismatched end tags and
/// items interleaved with other elements are all skipped over.
///
/// # Arguments
///
/// * `xml` - The raw RSS body
///
/// # Returns
///
/// The URLs read before the end of input. A syntax error stops the scan;
/// it is only returned when no guid had been read before it.
pub fn guid_urls(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.allow_dangling_amp = true;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut urls = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"guid" => {
                current = Some(String::new());
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"guid" => {
                if let Some(guid) = current.take() {
                    urls.push(guid.trim().to_string());
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(guid) = current.as_mut() {
                    guid.push_str(&t.decode()?);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(guid) = current.as_mut() {
                    guid.push_str(&c.decode()?);
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some(guid) = current.as_mut() {
                    if let Ok(Some(ch)) = r.resolve_char_ref() {
                        guid.push(ch);
                    } else if let Some(text) = resolve_predefined_entity(&r.decode()?) {
                        guid.push_str(text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) if urls.is_empty() => return Err(e),
            Err(e) => {
                warn!(
                    position = reader.error_position(),
                    error = %e,
                    kept = urls.len(),
                    "Feed is malformed; keeping guids read so far"
                );
                break;
            }
        }
    }

    Ok(urls.into_iter().filter(|url| !url.is_empty()).unique().collect())
}

/// Cleaned text of the whole page.
pub fn extract_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    clean_text(&document.root_element().text().collect::<String>())
}

/// Fetch the recent-stories feed and read its guids.
#[instrument(level = "info", skip_all)]
pub async fn index_articles<F: PageFetcher>(fetcher: &F) -> Discovery {
    let xml = match fetcher.get(FEED_URL).await {
        Ok(xml) => xml,
        Err(e) => {
            error!(url = FEED_URL, error = %e, "Error scraping Economic Times Realty");
            return Discovery::failed(format!("Failed to scrape Economic Times Realty: {e}"));
        }
    };

    match guid_urls(&xml) {
        Ok(urls) => {
            info!(count = urls.len(), source = FEED_URL, "Indexed Economic Times Realty article URLs");
            debug!(urls = ?urls, "Economic Times Realty URLs");
            Discovery::found(urls)
        }
        Err(e) => {
            error!(url = FEED_URL, error = %e, "Error parsing Economic Times Realty feed");
            Discovery::failed(format!("Failed to scrape Economic Times Realty: {e}"))
        }
    }
}

#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_article<F: PageFetcher>(fetcher: &F, url: &str) -> Option<String> {
    let html = fetch_page(fetcher, url).await?;
    let text = extract_text(&html);
    if let Some(t) = &text {
        debug!(bytes = t.len(), "Parsed Economic Times Realty article");
    }
    text
}
