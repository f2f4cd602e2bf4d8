//! Core types: inbound payload, validated batch request, outcomes and report

use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// Label recorded when a successful response carries no usable title
pub const NO_TITLE_FALLBACK: &str = "No title found";

/// Raw inbound payload for `POST /api/proxy`
///
/// Nothing here is trusted. Call [`BatchInput::validate`] to obtain a
/// [`BatchRequest`] the runner can execute.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct BatchInput {
    /// Target URL (required)
    #[serde(default)]
    pub url: Option<String>,

    /// Number of attempts (default: 1, clamped to 1..=100)
    #[serde(default)]
    pub count: Option<i64>,

    /// Base delay between attempts in milliseconds (default: 1000, clamped to 500..=10000)
    #[serde(default)]
    pub delay: Option<i64>,
}

impl BatchInput {
    /// Validate the payload against `limits`
    ///
    /// A missing or blank URL is [`Error::MissingLocator`]; an unparsable or
    /// non-HTTP URL is [`Error::InvalidLocator`]. `count` and `delay` fall back
    /// to their defaults when absent and are clamped into range otherwise.
    pub fn validate(self, limits: &LimitsConfig) -> Result<BatchRequest> {
        let raw = self.url.map(|u| u.trim().to_string()).unwrap_or_default();
        if raw.is_empty() {
            return Err(Error::MissingLocator);
        }

        let parsed = url::Url::parse(&raw).map_err(|e| Error::InvalidLocator {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidLocator {
                url: raw,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let count = self
            .count
            .unwrap_or(i64::from(limits.default_count))
            .clamp(i64::from(limits.min_count), i64::from(limits.max_count));

        let min_delay = i64::try_from(limits.min_delay_ms).unwrap_or(i64::MAX);
        let max_delay = i64::try_from(limits.max_delay_ms).unwrap_or(i64::MAX);
        let delay = self
            .delay
            .unwrap_or_else(|| i64::try_from(limits.default_delay_ms).unwrap_or(max_delay))
            .clamp(min_delay, max_delay);

        // Both values were clamped into unsigned ranges above
        Ok(BatchRequest {
            locator: raw,
            attempt_count: u32::try_from(count).unwrap_or(limits.max_count),
            base_delay: Duration::from_millis(u64::try_from(delay).unwrap_or(limits.max_delay_ms)),
        })
    }
}

/// A batch the runner can execute
///
/// Produced by [`BatchInput::validate`]. The runner checks only that
/// `locator` is non-empty; bounds on the other fields are the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Target URL
    pub locator: String,
    /// Number of sequential attempts
    pub attempt_count: u32,
    /// Base spacing between consecutive attempts
    pub base_delay: Duration,
}

impl BatchRequest {
    /// Build a request directly, bypassing boundary validation
    pub fn new(locator: impl Into<String>, attempt_count: u32, base_delay: Duration) -> Self {
        Self {
            locator: locator.into(),
            attempt_count,
            base_delay,
        }
    }
}

/// How one attempt ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status")]
pub enum AttemptResult {
    /// The target responded with a 2xx status
    #[serde(rename = "success")]
    Succeeded {
        /// HTTP status code of the response
        #[serde(rename = "statusCode")]
        status_code: u16,
        /// Extracted title, or the fallback label
        title: String,
    },
    /// The fetch failed; the batch carried on
    #[serde(rename = "error")]
    Failed {
        /// Message of the underlying failure, verbatim
        error: String,
    },
}

/// Outcome of a single attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttemptOutcome {
    /// 1-based attempt index
    pub attempt: u32,

    /// Result of the attempt
    #[serde(flatten)]
    pub result: AttemptResult,

    /// When the attempt concluded
    pub timestamp: DateTime<Utc>,
}

impl AttemptOutcome {
    /// Whether the attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self.result, AttemptResult::Succeeded { .. })
    }
}

/// Ordered outcomes of a finished batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Target URL, echoed from the request
    pub target: String,
    /// Number of attempts requested
    pub total_attempts: u32,
    /// One outcome per attempt, in attempt order
    pub results: Vec<AttemptOutcome>,
}

impl BatchReport {
    /// Number of successful attempts
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed attempts
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Response body for a completed batch
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchResponse {
    /// Always true for completed batches
    pub success: bool,

    /// The report
    #[serde(flatten)]
    pub report: BatchReport,
}

impl From<BatchReport> for BatchResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            success: true,
            report,
        }
    }
}
