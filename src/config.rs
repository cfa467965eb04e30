//! Runtime configuration.
//!
//! [`AppConfig`] is built once at startup (from an optional YAML file plus
//! CLI overrides) and passed by reference to every component that needs it.
//! Every field has a default, so an empty file or no file at all is valid.

use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

use crate::models::Source;

const DEFAULT_USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generative model identifier.
    pub model: String,
    /// Base URL of the `generateContent` REST API.
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    /// Attach the live web-search tool to every model request.
    pub enable_search: bool,
    /// Timeout for scraping requests.
    pub request_timeout_secs: u64,
    /// Timeout for one model call, including any grounding search.
    pub model_timeout_secs: u64,
    pub user_agents: Vec<String>,
    /// Proxy URL applied to all scraping traffic.
    pub proxy: Option<String>,
    /// Total attempts for the Realty Plus listing when it answers 403.
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub caps: SourceCaps,
    /// Directory for the per-source URL exports.
    pub output_dir: String,
    /// Diagnostic log file; warnings and errors are appended.
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-lite-preview-06-17".to_string(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            temperature: 0.7,
            enable_search: true,
            request_timeout_secs: 15,
            model_timeout_secs: 60,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            proxy: None,
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
            caps: SourceCaps::default(),
            output_dir: ".".to_string(),
            log_file: "scraper.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a YAML file, falling back to defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(Path::new(path))?;
        let config = Self::from_yaml(&raw)?;
        info!(config_path = path, model = %config.model, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Per-source limits on discovered URLs and on successfully processed articles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceCaps {
    pub construction_world_discovery: usize,
    pub realty_plus_discovery: usize,
    pub construction_world_processed: usize,
    pub economic_times_processed: usize,
    pub realty_plus_processed: usize,
}

impl Default for SourceCaps {
    fn default() -> Self {
        Self {
            construction_world_discovery: 25,
            realty_plus_discovery: 6,
            construction_world_processed: 7,
            economic_times_processed: 7,
            realty_plus_processed: 5,
        }
    }
}

impl SourceCaps {
    /// Maximum number of articles that will be enriched for `source` in one run.
    pub fn processed(&self, source: Source) -> usize {
        match source {
            Source::ConstructionWorld => self.construction_world_processed,
            Source::EconomicTimesRealty => self.economic_times_processed,
            Source::RealtyPlus => self.realty_plus_processed,
        }
    }
}
