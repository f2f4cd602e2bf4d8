//! # repeat-fetch
//!
//! Runs a fixed number of sequential fetches against one URL, spaced by a
//! base delay plus random jitter, and reports the outcome of every attempt.
//!
//! Each attempt records either the HTTP status and page title, or the error
//! that ended it. A failed attempt never aborts the batch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repeat_fetch::{BatchRequest, BatchRunner, Config, HttpFetcher, TitleExtractor};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let runner = BatchRunner::new(
//!         Arc::new(HttpFetcher::new()?),
//!         Arc::new(TitleExtractor),
//!         config.runner.clone(),
//!     );
//!
//!     let request = BatchRequest::new("https://example.com", 3, Duration::from_millis(1000));
//!     let report = runner.run(&request).await?;
//!
//!     for outcome in &report.results {
//!         println!("#{} success={}", outcome.attempt, outcome.is_success());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Page title extraction
pub mod extractor;
/// Single-request fetching
pub mod fetcher;
/// Batch execution engine
pub mod runner;
/// Core request and report types
pub mod types;

pub use config::{ApiConfig, BatchLimitConfig, Config, LimitsConfig, RunnerConfig};
pub use error::{ApiError, Error, FetchError, Result, ToHttpStatus};
pub use extractor::{Extractor, TitleExtractor};
pub use fetcher::{FetchOptions, FetchResponse, Fetcher, HttpFetcher};
pub use runner::{BatchRunner, JITTER_WINDOW, Jitter};
pub use types::{
    AttemptOutcome, AttemptResult, BatchInput, BatchReport, BatchRequest, BatchResponse,
    NO_TITLE_FALLBACK,
};

/// Resolve on Ctrl+C, or on SIGTERM where the platform has it.
///
/// Pass it to [`api::start_api_server`] to drain in-flight batches before exit.
/// A handler that cannot be installed is logged and never fires; the other
/// one still can.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_signal_waits_for_a_signal() {
        let waited = tokio::time::timeout(Duration::from_millis(50), shutdown_signal()).await;
        assert!(waited.is_err(), "must stay pending until a signal arrives");
    }
}
