//! Command-line interface definitions.
//!
//! One invocation is one run: fetch the latest news from every source,
//! then display the items that pass the source and date filters.

use chrono::NaiveDate;
use clap::Parser;

use crate::config::AppConfig;
use crate::filter::NewsFilter;
use crate::models::Source;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Today's items from every source
/// realty_news_digest
///
/// # Only Construction World and Realty Plus, over a date range, with CSV
/// realty_news_digest -s construction-world -s realty-plus \
///     --from 2024-01-02 --to 2024-01-04 --csv news_summaries.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Sources to display (repeatable; default: all)
    #[arg(short, long = "source", value_enum)]
    pub sources: Vec<Source>,

    /// First date to display, inclusive (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date to display, inclusive (YYYY-MM-DD; default: today)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Also print the collected items as a JSON document
    #[arg(long)]
    pub json: bool,

    /// Print the contents of the log file after the run
    #[arg(long)]
    pub show_log: bool,

    /// Export the full collection to this CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<String>,

    /// Directory for the per-source URL exports (overrides the config file)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Diagnostic log file, overriding the config file (default: scraper.log)
    #[arg(long)]
    pub log_file: Option<String>,
}

impl Cli {
    /// Apply flags that take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        if self.api_key.is_some() {
            config.api_key = self.api_key.clone();
        }
    }

    /// Build the display filter, defaulting to all sources and `today`.
    pub fn filter(&self, today: NaiveDate) -> NewsFilter {
        let mut filter = NewsFilter::for_day(today);
        if !self.sources.is_empty() {
            filter.sources = self.sources.clone();
        }
        filter.start = self.from.unwrap_or(today);
        filter.end = self.to.unwrap_or(today);
        filter
    }
}
