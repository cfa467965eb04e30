//! Page fetching with rotating user agents and a bounded 403 retry.
//!
//! Scrapers talk to the network only through [`PageFetcher`], so tests can
//! substitute scripted responses. [`HttpFetcher`] is the real implementation
//! on top of `reqwest`.

use rand::{Rng, rng};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::config::AppConfig;

/// Failure to obtain a page body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, FetchError::Status { status: 403, .. })
    }
}

/// Issue a GET request and return the response body.
///
/// Implementations pick a fresh user agent for every call and treat any
/// non-2xx status as [`FetchError::Status`].
pub trait PageFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Pool of user-agent strings, one chosen at random per request.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents }
    }

    pub fn pick(&self) -> Option<&str> {
        if self.agents.is_empty() {
            return None;
        }
        let idx = rng().random_range(0..self.agents.len());
        Some(self.agents[idx].as_str())
    }
}

/// [`PageFetcher`] backed by a `reqwest` client configured from [`AppConfig`].
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agents: UserAgentPool,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout());
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
            user_agents: UserAgentPool::new(config.user_agents.clone()),
        })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut request = self.client.get(url);
        if let Some(agent) = self.user_agents.pick() {
            debug!(user_agent = agent, "Selected user agent");
            request = request.header(reqwest::header::USER_AGENT, agent);
        }

        let t0 = Instant::now();
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        debug!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "GET completed");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.text().await.map_err(transport)
    }
}

/// Retry policy for pages that answer 403 Forbidden.
///
/// The delay before retry `n` (0-based) is `base_delay * 2^n`.
#[derive(Debug, Clone)]
pub struct ForbiddenRetry {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl ForbiddenRetry {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            base_delay: config.retry_base_delay(),
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Fetch `url`, retrying only on 403 until the policy's attempts run out.
///
/// Any other failure is returned immediately. Each attempt goes back through
/// [`PageFetcher::get`], so it carries a newly picked user agent.
///
/// # Arguments
///
/// * `fetcher` - The page fetcher used for every attempt
/// * `url` - The page to fetch
/// * `policy` - Attempt limit and base delay; the wait before retry `n`
///   is `base_delay * 2^n`
///
/// # Returns
///
/// The response body from the first successful attempt, or the last
/// [`FetchError`] (a 403 once attempts are exhausted).
#[instrument(level = "info", skip(fetcher, policy))]
pub async fn get_with_forbidden_retry<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    policy: &ForbiddenRetry,
) -> Result<String, FetchError> {
    let max = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        match fetcher.get(url).await {
            Ok(body) => return Ok(body),
            Err(e) if e.is_forbidden() && attempt + 1 < max => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    max,
                    ?delay,
                    "403 Forbidden; retrying with a new user agent"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_forbidden() {
                    error!(attempts = max, error = %e, "403 Forbidden; retries exhausted");
                }
                return Err(e);
            }
        }
    }
}
