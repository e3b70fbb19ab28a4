//! HTTP fetcher implementation
//!
//! This module handles all outbound page and API retrieval, including:
//! - Rotating desktop user agents and an origin `Referer`
//! - Block-page detection for anti-bot interstitials
//! - A JSON-accept secondary request for picky APIs
//! - An optional anti-bot challenge solver as the last fallback
//! - Exponential backoff with jitter between attempts

use crate::config::FetcherConfig;
use crate::url::origin_referer;
use crate::FetchError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Desktop browser user agents rotated on every attempt
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13.6; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Statuses that trigger the secondary request and challenge fallbacks
pub const RETRY_STATUS: &[u16] = &[
    401, 403, 404, 408, 409, 425, 429, 500, 502, 503, 504, 520, 521, 522, 523, 524,
];

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7";
const JSON_ACCEPT: &str = "application/json,*/*;q=0.8";

/// Bodies shorter than this are treated as block pages regardless of content
const MIN_PLAUSIBLE_BODY: usize = 64;

static BLOCKPAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(just a moment|cloudflare|cf-[-\w]*-ray|attention required|access denied|request rejected|verify you are a human|bot detection)",
    )
    .expect("valid regex")
});

/// True when a body looks like an anti-bot interstitial rather than content
pub fn looks_like_blockpage(body: &str) -> bool {
    body.len() < MIN_PLAUSIBLE_BODY || BLOCKPAGE_RE.is_match(body)
}

/// Per-call knobs for a fetch
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Header overrides applied after the defaults
    pub headers: Vec<(String, String)>,
    /// Accept bodies that match a block-page signature
    pub allow_blockpage: bool,
}

impl FetchOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn allow_blockpage(mut self) -> Self {
        self.allow_blockpage = true;
        self
    }
}

/// Outcome of a successful fetch with its retry history
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub body: String,
    pub status: u16,
    /// Attempts made, counting the successful one
    pub attempts: u32,
    /// Sleeps taken between attempts, in order
    pub delays: Vec<Duration>,
}

/// A page returned by an anti-bot challenge solver
#[derive(Debug, Clone)]
pub struct SolvedPage {
    pub status: u16,
    pub body: String,
}

/// Fetches a URL through a service that can pass anti-bot challenges
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    async fn solve(&self, url: &str, timeout: Duration) -> Result<SolvedPage, FetchError>;
}

/// Client for a FlareSolverr-compatible `/v1` endpoint
pub struct FlareSolverr {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SolverResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    solution: Option<SolverSolution>,
}

#[derive(Debug, Deserialize)]
struct SolverSolution {
    status: u16,
    #[serde(default)]
    response: String,
}

impl FlareSolverr {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ChallengeSolver for FlareSolverr {
    async fn solve(&self, url: &str, timeout: Duration) -> Result<SolvedPage, FetchError> {
        let body = serde_json::json!({
            "cmd": "request.get",
            "url": url,
            "maxTimeout": timeout.as_millis() as u64,
        });

        // a browser-driven solve outlives the page timeout
        let response: SolverResponse = self
            .client
            .post(&self.endpoint)
            .timeout(timeout * 2)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        match response.solution {
            Some(solution) if response.status.eq_ignore_ascii_case("ok") => Ok(SolvedPage {
                status: solution.status,
                body: solution.response,
            }),
            _ => Err(FetchError::Challenge(format!(
                "status={} message={}",
                response.status, response.message
            ))),
        }
    }
}

/// One HTTP exchange, reduced to what the acceptance rules look at
struct Exchange {
    status: u16,
    body: String,
    is_json: bool,
}

/// Resilient HTTP retriever shared by every adapter and channel reader
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    timeout: Duration,
    backoff_base_secs: f64,
    jitter_max_secs: f64,
    min_body_len: usize,
    user_agents: Arc<Vec<String>>,
    solver: Option<Arc<dyn ChallengeSolver>>,
}

impl Fetcher {
    /// Builds a fetcher from configuration
    ///
    /// A FlareSolverr client is attached when `challenge_solver_url` is set
    /// and the fallback is not disabled.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        let solver: Option<Arc<dyn ChallengeSolver>> = match &config.challenge_solver_url {
            Some(endpoint) if !config.disable_challenge_fallback => {
                Some(Arc::new(FlareSolverr::new(endpoint.clone())?))
            }
            _ => None,
        };

        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
            timeout,
            backoff_base_secs: config.backoff_base_secs.max(0.0),
            jitter_max_secs: config.jitter_max_secs.max(0.0),
            min_body_len: config.min_body_len,
            user_agents: Arc::new(DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()),
            solver,
        })
    }

    /// Replaces the challenge solver
    pub fn with_solver(mut self, solver: Arc<dyn ChallengeSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Fetches a URL and returns its body
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        Ok(self.fetch_report(url, options).await?.body)
    }

    /// Fetches a URL, returning the body along with attempt and delay history
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 200, long enough, no block signature | Return body |
    /// | Retryable status, short body or block page | JSON-accept request, then solver |
    /// | Transport error | Recorded as the last error |
    /// | Attempt failed and more remain | Sleep `base * 2^i + jitter` |
    ///
    /// Fails with `FetchError::Exhausted` only after every attempt failed.
    pub async fn fetch_report(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchReport, FetchError> {
        let referer = origin_referer(url);
        let mut last_status: Option<u16> = None;
        let mut last_error: Option<String> = None;
        let mut delays = Vec::new();

        for attempt in 0..self.max_attempts {
            tracing::debug!(url, attempt = attempt + 1, max = self.max_attempts, "GET");

            let headers = self.build_headers(referer.as_deref(), options, None);
            match self.exchange(url, headers).await {
                Ok(primary) => {
                    last_status = Some(primary.status);
                    if self.accepts(&primary, options.allow_blockpage) {
                        return Ok(self.report(primary, attempt, delays));
                    }

                    if self.needs_fallback(&primary) {
                        if !primary.is_json {
                            let headers =
                                self.build_headers(referer.as_deref(), options, Some(JSON_ACCEPT));
                            match self.exchange(url, headers).await {
                                Ok(secondary) => {
                                    last_status = Some(secondary.status);
                                    if self.accepts(&secondary, false) {
                                        return Ok(self.report(secondary, attempt, delays));
                                    }
                                }
                                Err(e) => last_error = Some(e.to_string()),
                            }
                        }

                        if let Some(solver) = &self.solver {
                            match solver.solve(url, self.timeout).await {
                                Ok(page) => {
                                    last_status = Some(page.status);
                                    let solved = Exchange {
                                        status: page.status,
                                        body: page.body,
                                        is_json: false,
                                    };
                                    if self.accepts(&solved, options.allow_blockpage) {
                                        return Ok(self.report(solved, attempt, delays));
                                    }
                                }
                                Err(e) => last_error = Some(e.to_string()),
                            }
                        }
                    }
                }
                Err(e) => last_error = Some(e.to_string()),
            }

            if attempt + 1 < self.max_attempts {
                let delay = self.backoff_delay(attempt);
                tracing::debug!(url, attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "Backing off");
                delays.push(delay);
                tokio::time::sleep(delay).await;
            }
        }

        tracing::warn!(url, status = ?last_status, error = ?last_error, "Fetch exhausted");
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            status: last_status,
            last_error,
        })
    }

    /// Fetches and parses JSON, stripping an HTML wrapper if the first parse fails
    pub async fn fetch_json(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<serde_json::Value, FetchError> {
        let mut options = options.clone();
        if !options
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("accept"))
        {
            options.headers.insert(0, ("Accept".to_string(), JSON_ACCEPT.to_string()));
        }

        let body = self.fetch(url, &options).await?;
        parse_json_lenient(&body).map_err(|e| FetchError::Json {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn exchange(&self, url: &str, headers: HeaderMap) -> Result<Exchange, reqwest::Error> {
        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);
        let body = response.text().await?;
        Ok(Exchange {
            status,
            body,
            is_json,
        })
    }

    fn accepts(&self, exchange: &Exchange, allow_blockpage: bool) -> bool {
        exchange.status == 200
            && exchange.body.len() >= self.min_body_len
            && (allow_blockpage || !looks_like_blockpage(&exchange.body))
    }

    fn needs_fallback(&self, exchange: &Exchange) -> bool {
        RETRY_STATUS.contains(&exchange.status)
            || exchange.body.len() < self.min_body_len
            || looks_like_blockpage(&exchange.body)
    }

    fn report(&self, exchange: Exchange, attempt: u32, delays: Vec<Duration>) -> FetchReport {
        FetchReport {
            body: exchange.body,
            status: exchange.status,
            attempts: attempt + 1,
            delays,
        }
    }

    fn build_headers(
        &self,
        referer: Option<&str>,
        options: &FetchOptions,
        accept: Option<&'static str>,
    ) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(
            HeaderName::from_static("accept-language"),
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            HeaderName::from_static("cache-control"),
            HeaderValue::from_static("no-cache"),
        );
        headers.insert(
            HeaderName::from_static("pragma"),
            HeaderValue::from_static("no-cache"),
        );

        if let Some(ua) = self.pick_user_agent() {
            if let Ok(value) = HeaderValue::from_str(&ua) {
                headers.insert(USER_AGENT, value);
            }
        }
        if let Some(referer) = referer {
            if let Ok(value) = HeaderValue::from_str(referer) {
                headers.insert(REFERER, value);
            }
        }

        for (name, value) in &options.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::debug!(header = %name, "Skipping invalid header override"),
            }
        }

        if let Some(accept) = accept {
            headers.insert(ACCEPT, HeaderValue::from_static(accept));
        }

        headers
    }

    fn pick_user_agent(&self) -> Option<String> {
        self.user_agents.choose(&mut rand::rng()).cloned()
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter_max_secs > 0.0 {
            rand::rng().random_range(0.0..self.jitter_max_secs)
        } else {
            0.0
        };
        let secs = self.backoff_base_secs * 2f64.powi(attempt as i32) + jitter;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Parses JSON, retrying once on the text content if the body is wrapped in markup
pub fn parse_json_lenient(body: &str) -> Result<serde_json::Value, serde_json::Error> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            let document = scraper::Html::parse_document(body);
            let text = document
                .root_element()
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                return Err(first);
            }
            serde_json::from_str(&text)
        }
    }
}
