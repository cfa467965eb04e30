//! Run orchestration.
//!
//! A run visits every [`Source`] in turn: index its URLs, export the raw URL
//! list, then walk the URLs in discovery order, extracting and enriching
//! each one until the source's success cap is reached. Nothing runs
//! concurrently; every request completes before the next one starts.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing::{error, info, instrument, warn};

use crate::api::GenerateText;
use crate::config::AppConfig;
use crate::enrich::Enricher;
use crate::http::PageFetcher;
use crate::models::{NewsItem, Source};
use crate::outputs::csv_export;
use crate::scrapers;

/// A source whose listing could not be read during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: Source,
    pub message: String,
}

/// Everything one run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    pub items: Vec<NewsItem>,
    pub failures: Vec<SourceFailure>,
}

impl RunReport {
    pub fn count_for(&self, source: Source) -> usize {
        self.items.iter().filter(|item| item.source == source).count()
    }
}

pub struct Pipeline<'a, F, G> {
    fetcher: &'a F,
    enricher: Enricher<'a, G>,
    config: &'a AppConfig,
    run_date: NaiveDate,
}

impl<'a, F, G> Pipeline<'a, F, G>
where
    F: PageFetcher,
    G: GenerateText,
{
    pub fn new(fetcher: &'a F, model: &'a G, config: &'a AppConfig, run_date: NaiveDate) -> Self {
        Self {
            fetcher,
            enricher: Enricher::new(model, config),
            config,
            run_date,
        }
    }

    /// Process all sources and collect the resulting items and failures.
    ///
    /// Sources run in [`Source::ALL`] order. A source whose listing fails
    /// contributes one [`SourceFailure`] and no items, and its previous URL
    /// list export is left untouched.
    ///
    /// # Returns
    ///
    /// A [`RunReport`] holding at most the per-source processing cap of items
    /// for each source.
    #[instrument(level = "info", skip_all, fields(run_date = %self.run_date))]
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::default();

        for source in Source::ALL {
            info!(%source, "Fetching URLs");
            let discovery = scrapers::discover(source, self.fetcher, self.config).await;
            if let Some(message) = discovery.error {
                // Leave the previous run's URL list in place.
                warn!(%source, %message, "Source listing unavailable");
                report.failures.push(SourceFailure { source, message });
            } else {
                let export_dir = Path::new(&self.config.output_dir);
                match csv_export::write_url_list(export_dir, source, &discovery.urls).await {
                    Ok(path) => info!(%source, path = %path.display(), "Wrote URL list"),
                    Err(e) => error!(%source, error = %e, "Failed to write URL list"),
                }
            }

            let items = self.process_source(source, &discovery.urls).await;
            info!(
                %source,
                discovered = discovery.urls.len(),
                processed = items.len(),
                "Source complete"
            );
            report.items.extend(items);
        }

        info!(total = report.items.len(), failures = report.failures.len(), "Run complete");
        report
    }

    /// Extract and enrich `urls` in order, stopping after the source's cap of
    /// successfully extracted articles.
    async fn process_source(&self, source: Source, urls: &[String]) -> Vec<NewsItem> {
        let cap = self.config.caps.processed(source);

        stream::iter(urls)
            .filter_map(move |url| async move {
                scrapers::extract(source, self.fetcher, url)
                    .await
                    .map(|text| (url, text))
            })
            .take(cap)
            .then(move |(url, text)| async move {
                let enrichment = self.enricher.enrich(&text, url).await;
                NewsItem::assemble(url.clone(), source, self.run_date, enrichment)
            })
            .collect()
            .await
    }
}
