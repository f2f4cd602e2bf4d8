//! Error types for repeat-fetch
//!
//! Two families live here:
//! - [`Error`] is fatal to a whole call: the batch could not be attempted at all
//!   (bad locator, bad payload, server setup failures).
//! - [`FetchError`] is local to one attempt. The runner records its message in a
//!   failed outcome and moves on to the next attempt.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for repeat-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for repeat-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// No target URL was supplied
    #[error("URL is required")]
    MissingLocator,

    /// The target URL is present but unusable
    #[error("invalid URL '{url}': {reason}")]
    InvalidLocator {
        /// The URL as received
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Request payload could not be decoded
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP method not accepted on this route
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The client already has its maximum number of batches running
    #[error("too many batches in flight from this client (limit {limit})")]
    TooManyBatches {
        /// Concurrent batches allowed per client
        limit: u32,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "limits.max_count")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Failure of a single fetch attempt
///
/// The `Display` output is copied verbatim into the failed outcome, so keep the
/// messages readable on their own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response within the per-attempt timeout
    #[error("timeout of {timeout_ms}ms exceeded")]
    Timeout {
        /// The timeout that was exceeded
        timeout_ms: u64,
    },

    /// Could not connect to the target
    #[error("connection failed: {0}")]
    Connect(String),

    /// Target answered with a non-2xx status
    #[error("request failed with status code {code}")]
    Status {
        /// HTTP status code returned by the target
        code: u16,
    },

    /// Response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure
    #[error("{0}")]
    Request(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            FetchError::Status {
                code: status.as_u16(),
            }
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// API error response body
///
/// # Example JSON Response
///
/// ```json
/// {
///   "success": false,
///   "error": "URL is required",
///   "code": "missing_url"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Always false for error bodies
    pub success: bool,

    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "missing_url", "invalid_request")
    pub code: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the batch could not be attempted
            Error::MissingLocator => 400,
            Error::InvalidLocator { .. } => 400,
            Error::InvalidRequest(_) => 400,

            Error::MethodNotAllowed => 405,
            Error::TooManyBatches { .. } => 429,

            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::MissingLocator => "missing_url",
            Error::InvalidLocator { .. } => "invalid_url",
            Error::InvalidRequest(_) => "invalid_request",
            Error::MethodNotAllowed => "method_not_allowed",
            Error::TooManyBatches { .. } => "too_many_batches",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::InvalidLocator { url, .. } => Some(serde_json::json!({ "url": url })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::TooManyBatches { limit } => Some(serde_json::json!({ "limit": limit })),
            _ => None,
        };

        ApiError {
            success: false,
            error: message,
            code,
            details,
        }
    }
}
