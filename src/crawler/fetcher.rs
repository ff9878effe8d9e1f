//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests with flat query parameters
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Performs one logical GET of a page and returns its body
///
/// Implementations own their retry policy; the pipeline treats every
/// returned error as final for that page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use tcg_harvest::config::{CrawlerConfig, UserAgentConfig};
/// use tcg_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` over a shared reqwest client
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 429 / 5xx | Retry up to `max_retries` times |
/// | Timeout | Retry, then `FetchError::Timeout` |
/// | Connection error | Retry, then `FetchError::Http` |
/// | Other HTTP status | Immediate `FetchError::Status` |
///
/// The delay before retry `n` (0-based) is `retry_backoff * 2^n`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, max_retries: u32, retry_backoff: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_backoff,
        }
    }

    /// Builds the client and fetcher from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler)?;
        Ok(Self::new(
            client,
            crawler.max_retries,
            Duration::from_millis(crawler.retry_backoff_ms),
        ))
    }

    async fn fetch_once(&self, url: &str, params: &[(String, String)]) -> Attempt {
        let response = match self.client.get(url).query(params).send().await {
            Ok(response) => response,
            Err(e) => return classify_transport_error(url, e),
        };

        let status = response.status();
        if status.is_success() {
            return match response.text().await {
                Ok(body) => Attempt::Done(body),
                Err(e) => classify_transport_error(url, e),
            };
        }

        let error = FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        };

        if is_transient_status(status) {
            Attempt::Retry(error)
        } else {
            Attempt::Fail(error)
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<String, FetchError> {
        let mut attempt = 0;

        loop {
            match self.fetch_once(url, params).await {
                Attempt::Done(body) => return Ok(body),
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry(e) => {
                    if attempt >= self.max_retries {
                        return Err(e);
                    }

                    let delay = self
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    tracing::debug!(
                        "Retrying {} in {:?} (attempt {}/{}): {}",
                        url,
                        delay,
                        attempt + 1,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Outcome of a single request attempt
enum Attempt {
    Done(String),
    Retry(FetchError),
    Fail(FetchError),
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn classify_transport_error(url: &str, e: reqwest::Error) -> Attempt {
    if e.is_timeout() {
        Attempt::Retry(FetchError::Timeout {
            url: url.to_string(),
        })
    } else if e.is_connect() || e.is_request() {
        Attempt::Retry(FetchError::Http {
            url: url.to_string(),
            source: e,
        })
    } else if e.is_builder() {
        Attempt::Fail(FetchError::InvalidUrl(url.to_string()))
    } else {
        Attempt::Fail(FetchError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}
