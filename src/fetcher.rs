//! Network retrieval capability used by the batch runner
//!
//! The runner only sees the [`Fetcher`] trait. [`HttpFetcher`] is the reqwest
//! implementation used by the server; tests substitute scripted fetchers.

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Per-attempt fetch timeout
pub const FETCH_TIMEOUT: Duration = Duration::from_millis(10_000);

/// User-Agent sent with every fetch
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Options passed with every fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Give up and fail once this much time has passed
    pub timeout: Duration,
    /// Extra request headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: FETCH_TIMEOUT,
            headers: vec![("User-Agent".to_string(), USER_AGENT.to_string())],
        }
    }
}

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Response body decoded as text
    pub body: String,
}

/// Trait for retrieving a resource once
///
/// Implementations must honor `options.timeout` by failing rather than
/// hanging, and must not retry internally. Spacing and repetition belong to
/// the runner.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` once
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the target cannot be reached, answers with
    /// a non-2xx status, does not answer within the timeout, or sends a body
    /// that cannot be read.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// reqwest-backed fetcher
///
/// Holds one connection pool shared by every batch served by the process.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh client
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse, FetchError> {
        let timeout_ms = options.timeout.as_millis() as u64;
        let timed_out = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout { timeout_ms }
            } else {
                FetchError::from(e)
            }
        };

        let mut request = self.client.get(url).timeout(options.timeout);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(timed_out)?;
        let response = response.error_for_status().map_err(timed_out)?;
        let status_code = response.status().as_u16();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { timeout_ms }
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(FetchResponse { status_code, body })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
