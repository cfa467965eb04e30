//! CSV exports.
//!
//! Two tables are produced:
//! - one URL list per source, written on every run (header `URL`)
//! - the full news collection on request, with header
//!   `news_url,summary,city,locality,date,source,news_type`

use csv::WriterBuilder;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{NewsItem, Source};

const NEWS_HEADER: [&str; 7] = [
    "news_url",
    "summary",
    "city",
    "locality",
    "date",
    "source",
    "news_type",
];

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, Box<dyn Error>> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Render a URL list as CSV, one URL per row.
pub fn url_list_csv(urls: &[String]) -> Result<String, Box<dyn Error>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(["URL"])?;
    for url in urls {
        writer.write_record([url])?;
    }
    finish(writer)
}

/// Render news items as CSV. The header is written even when `items` is empty.
pub fn news_csv(items: &[NewsItem]) -> Result<String, Box<dyn Error>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(NEWS_HEADER)?;
    for item in items {
        writer.serialize(item)?;
    }
    finish(writer)
}

/// Write the raw URL list for `source` into `dir`, replacing any previous one.
#[instrument(level = "debug", skip(urls), fields(count = urls.len()))]
pub async fn write_url_list(
    dir: &Path,
    source: Source,
    urls: &[String],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(source.url_export_file());
    fs::write(&path, url_list_csv(urls)?).await?;
    Ok(path)
}

#[instrument(level = "info", skip(items), fields(count = items.len()))]
pub async fn write_news_csv(path: &str, items: &[NewsItem]) -> Result<(), Box<dyn Error>> {
    fs::write(path, news_csv(items)?).await?;
    info!(path, "Wrote news CSV");
    Ok(())
}
