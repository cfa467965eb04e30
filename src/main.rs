//! # Realty News Digest
//!
//! Fetches recent articles from three Indian real-estate and construction
//! publications, extracts their text, and asks a Gemini model to geo-tag,
//! classify and summarize each one.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... realty_news_digest --from 2024-01-01 --csv news_summaries.csv
//! ```
//!
//! ## Architecture
//!
//! One run is a single linear pipeline, source by source:
//! 1. **Indexing**: discover candidate article URLs (listing page or RSS feed)
//! 2. **Fetching**: download each article and extract its text
//! 3. **Enrichment**: three model calls per article (location, category, summary)
//! 4. **Output**: filter and print the items, optionally as JSON and CSV

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod enrich;
mod filter;
mod http;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

#[cfg(test)]
mod testing;

use api::GeminiClient;
use cli::Cli;
use config::AppConfig;
use http::HttpFetcher;
use models::Source;
use outputs::{csv_export, display, json};
use pipeline::Pipeline;
use utils::{ensure_writable_dir, read_log};

/// Console output on stderr filtered by `RUST_LOG`, plus warnings and errors
/// appended to `log_file`.
fn init_tracing(log_file: &str) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let console = tfmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(filter);
    let log = tfmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry().with(console).with(log).init();
    Ok(())
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    init_tracing(&config.log_file)?;

    let start_time = std::time::Instant::now();
    info!("realty_news_digest starting up");
    debug!(?args.sources, ?args.from, ?args.to, "Parsed CLI arguments");
    info!(
        model = %config.model,
        log_file = %config.log_file,
        output_dir = %config.output_dir,
        "Configuration ready"
    );
    if config.api_key.is_none() {
        warn!("No Gemini API key configured; enrichment will fall back to defaults");
    }

    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = HttpFetcher::new(&config)?;
    let model = GeminiClient::new(&config)?;
    let today = Local::now().date_naive();

    println!("Fetching and summarizing news...");
    let report = Pipeline::new(&fetcher, &model, &config, today).run().await;

    let filter = args.filter(today);
    println!("{}", display::render_report(&report, &filter, &config.log_file));

    if args.json {
        match json::news_document(&report.items) {
            Ok(doc) => println!("{doc}"),
            Err(e) => error!(error = %e, "Failed to render JSON"),
        }
    }

    if let Some(path) = &args.csv {
        if report.items.is_empty() {
            warn!(path, "Nothing to export; skipping CSV");
        } else if let Err(e) = csv_export::write_news_csv(path, &report.items).await {
            error!(path, error = %e, "Failed to write news CSV");
        } else {
            println!("Exported {} items to {path}", report.items.len());
        }
    }

    if args.show_log {
        match read_log(&config.log_file).await? {
            Some(contents) => println!("Log File ({}):\n{contents}", config.log_file),
            None => println!("No log file found yet."),
        }
    }

    for source in Source::ALL {
        info!(%source, count = report.count_for(source), "Items collected");
    }
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        items = report.items.len(),
        failed_sources = report.failures.len(),
        "Execution complete"
    );
    Ok(())
}
