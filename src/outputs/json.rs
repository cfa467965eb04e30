//! JSON rendering of a run's collection.
//!
//! The document has a single top-level key:
//! ```text
//! {"news": [ { "news_url": ..., "summary": ..., ... }, ... ]}
//! ```

use serde::Serialize;

use crate::models::NewsItem;

#[derive(Debug, Serialize)]
struct NewsDocument<'a> {
    news: &'a [NewsItem],
}

/// Pretty-printed `{"news": [...]}` document for `items`.
pub fn news_document(items: &[NewsItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&NewsDocument { news: items })
}
