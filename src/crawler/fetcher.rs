//! Page fetching
//!
//! This module handles all page retrieval for the crawler, including:
//! - The `PageFetcher` interface shared by every fetch strategy
//! - Building HTTP clients for the plain and session-headers strategies
//! - Retry with a fixed attempt cap and fixed delay
//! - Error classification
//!
//! Fetchers never return `Err`; failures are reported as a Failed
//! `FetchResult` so that one dead URL cannot abort a crawl.

use crate::config::{FetchStrategy, UserAgentConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// User agent presented by the session-headers strategy
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// One fetch attempt's input
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
    pub strategy: FetchStrategy,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: Url, strategy: FetchStrategy, timeout: Duration) -> Self {
        Self {
            url,
            strategy,
            timeout,
        }
    }
}

/// Outcome status of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    Failed,
}

/// Cause of a failed fetch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) => true,
            Self::Status(code) => *code >= 500,
            Self::Body(_) | Self::Browser(_) | Self::Other(_) => false,
        }
    }

    fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The requested URL
    pub url: Url,
    pub status: FetchStatus,
    /// Raw HTML on success
    pub body: Option<String>,
    /// Failure cause
    pub error: Option<FetchError>,
    /// HTTP status code, when a response was received
    pub status_code: Option<u16>,
    /// Full-page PNG captured by the rendered strategy
    pub screenshot: Option<Vec<u8>>,
    /// Attempts made, including retries
    pub attempts: u32,
}

impl FetchResult {
    pub fn ok(url: Url, body: String, status_code: Option<u16>) -> Self {
        Self {
            url,
            status: FetchStatus::Ok,
            body: Some(body),
            error: None,
            status_code,
            screenshot: None,
            attempts: 1,
        }
    }

    pub fn failed(url: Url, error: FetchError) -> Self {
        let status_code = match error {
            FetchError::Status(code) => Some(code),
            _ => None,
        };
        Self {
            url,
            status: FetchStatus::Failed,
            body: None,
            error: Some(error),
            status_code,
            screenshot: None,
            attempts: 1,
        }
    }

    pub fn with_screenshot(mut self, screenshot: Option<Vec<u8>>) -> Self {
        self.screenshot = screenshot;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }

    /// Human-readable failure description
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Retrieves raw HTML for a URL
///
/// Implementations must be shareable across worker tasks and must report
/// network failures through `FetchResult` rather than panicking.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult;

    /// Largest number of fetches this fetcher can serve at once
    fn max_parallelism(&self) -> Option<usize> {
        None
    }

    /// Releases run-scoped resources such as a browser process
    async fn shutdown(&self) {}
}

/// Builds an HTTP client for a fetch strategy
///
/// * `Plain` sends the crawler identity user agent and keeps no cookies.
/// * `SessionHeaders` sends a browser-like user agent and accept headers,
///   and keeps one cookie store for the whole crawl.
///
/// # Example
///
/// ```no_run
/// use sumi_scribe::config::{FetchStrategy, UserAgentConfig};
/// use sumi_scribe::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), FetchStrategy::Plain).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    strategy: FetchStrategy,
) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    match strategy {
        FetchStrategy::SessionHeaders => {
            let mut headers = HeaderMap::new();
            headers.insert(
                ACCEPT,
                HeaderValue::from_static(
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                ),
            );
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9,ko;q=0.8"));

            let agent = config
                .browser_override
                .clone()
                .unwrap_or_else(|| BROWSER_USER_AGENT.to_string());

            builder
                .user_agent(agent)
                .default_headers(headers)
                .cookie_store(true)
                .build()
        }
        FetchStrategy::Plain | FetchStrategy::Rendered => {
            builder.user_agent(config.identity()).build()
        }
    }
}

/// Fetcher for the plain and session-headers strategies
///
/// The client (and with it the session cookie store) is built once and
/// shared read-only by every request of the crawl.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig, strategy: FetchStrategy) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, strategy)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        fetch_url(&self.client, request).await
    }
}

/// Performs a single GET and classifies the outcome
pub async fn fetch_url(client: &Client, request: &FetchRequest) -> FetchResult {
    let url = request.url.clone();

    let response = match client
        .get(url.clone())
        .timeout(request.timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return FetchResult::failed(url, FetchError::from_reqwest(&e)),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::failed(url, FetchError::Status(status.as_u16()));
    }

    match response.text().await {
        Ok(body) => FetchResult::ok(url, body, Some(status.as_u16())),
        Err(e) if e.is_timeout() => FetchResult::failed(url, FetchError::Timeout),
        Err(e) => FetchResult::failed(url, FetchError::Body(e.to_string())),
    }
}

/// Fixed-count, fixed-delay retry policy
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least 1
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Wraps a fetcher with the retry policy
///
/// Only retryable failures (timeouts, connection errors, 5xx) are retried.
pub struct RetryingFetcher {
    inner: Arc<dyn PageFetcher>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl PageFetcher for RetryingFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        let mut attempt = 1;
        loop {
            let mut result = self.inner.fetch(request).await;
            result.attempts = attempt;

            let retry = matches!(&result.error, Some(e) if e.is_retryable())
                && attempt < self.policy.max_attempts;
            if !retry {
                return result;
            }

            tracing::debug!(
                "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                attempt,
                self.policy.max_attempts,
                request.url,
                result.error_message(),
                self.policy.delay
            );
            tokio::time::sleep(self.policy.delay).await;
            attempt += 1;
        }
    }

    fn max_parallelism(&self) -> Option<usize> {
        self.inner.max_parallelism()
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the given error a fixed number of times, then succeeds
    struct FlakyFetcher {
        failures: u32,
        error: FetchError,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn fetch(&self, request: &FetchRequest) -> FetchResult {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                FetchResult::failed(request.url.clone(), self.error.clone())
            } else {
                FetchResult::ok(request.url.clone(), "<html></html>".to_string(), Some(200))
            }
        }
    }

    fn request() -> FetchRequest {
        FetchRequest::new(
            Url::parse("https://example.com/").unwrap(),
            FetchStrategy::Plain,
            Duration::from_secs(1),
        )
    }

    fn flaky(failures: u32, error: FetchError) -> Arc<FlakyFetcher> {
        Arc::new(FlakyFetcher {
            failures,
            error,
            calls: AtomicU32::new(0),
        })
    }

    #[test]
    fn test_build_http_client() {
        let config = UserAgentConfig::default();
        assert!(build_http_client(&config, FetchStrategy::Plain).is_ok());
        assert!(build_http_client(&config, FetchStrategy::SessionHeaders).is_ok());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::Connect("refused".into()).is_retryable());
        assert!(FetchError::Status(503).is_retryable());
        assert!(!FetchError::Status(404).is_retryable());
        assert!(!FetchError::Status(429).is_retryable());
        assert!(!FetchError::Body("eof".into()).is_retryable());
    }

    #[test]
    fn test_failed_result_records_status_code() {
        let result = FetchResult::failed(
            Url::parse("https://example.com/").unwrap(),
            FetchError::Status(404),
        );
        assert!(!result.is_ok());
        assert_eq!(result.status_code, Some(404));
        assert_eq!(result.error_message(), "HTTP 404");
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let inner = flaky(2, FetchError::Timeout);
        let fetcher = RetryingFetcher::new(inner.clone(), RetryPolicy::new(3, Duration::ZERO));

        let result = fetcher.fetch(&request()).await;
        assert!(result.is_ok());
        assert_eq!(result.attempts, 3);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_is_capped() {
        let inner = flaky(10, FetchError::Status(500));
        let fetcher = RetryingFetcher::new(inner.clone(), RetryPolicy::new(3, Duration::ZERO));

        let result = fetcher.fetch(&request()).await;
        assert!(!result.is_ok());
        assert_eq!(result.attempts, 3);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_for_not_found() {
        let inner = flaky(10, FetchError::Status(404));
        let fetcher = RetryingFetcher::new(inner.clone(), RetryPolicy::new(3, Duration::ZERO));

        let result = fetcher.fetch(&request()).await;
        assert_eq!(result.error, Some(FetchError::Status(404)));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
