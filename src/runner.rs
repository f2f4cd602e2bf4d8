//! Batch runner: sequential fetch attempts with jittered spacing
//!
//! For a request of N attempts the runner fetches the target N times, one
//! after another. Before every attempt except the first it sleeps for the base
//! delay plus a random amount drawn from `[0, JITTER_WINDOW)`. Each attempt
//! ends in exactly one [`AttemptOutcome`]; a failed fetch is recorded and the
//! batch moves on, so a report always holds N outcomes.
//!
//! The only suspension points are the inter-attempt sleep and the fetch
//! itself. Attempts never overlap.
//!
//! # Example
//!
//! ```no_run
//! use repeat_fetch::config::RunnerConfig;
//! use repeat_fetch::extractor::TitleExtractor;
//! use repeat_fetch::fetcher::HttpFetcher;
//! use repeat_fetch::runner::BatchRunner;
//! use repeat_fetch::types::BatchRequest;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = BatchRunner::new(
//!     Arc::new(HttpFetcher::new()?),
//!     Arc::new(TitleExtractor),
//!     RunnerConfig::default(),
//! );
//!
//! let request = BatchRequest::new("https://example.com", 3, Duration::from_millis(500));
//! let report = runner.run(&request).await?;
//! assert_eq!(report.results.len(), 3);
//! # Ok(())
//! # }
//! ```

use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::fetcher::{FetchOptions, Fetcher};
use crate::types::{AttemptOutcome, AttemptResult, BatchReport, BatchRequest, NO_TITLE_FALLBACK};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Exclusive upper bound of the random addition to every inter-attempt delay
///
/// Fixed regardless of the base delay, so spacing never settles into a
/// constant cadence.
pub const JITTER_WINDOW: Duration = Duration::from_millis(2000);

/// Source of inter-attempt jitter
///
/// Each batch builds its own, so concurrent batches share no random state.
#[derive(Debug)]
pub struct Jitter {
    rng: StdRng,
}

impl Jitter {
    /// Jitter seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Jitter with a fixed seed; the same seed replays the same sequence
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build the jitter source described by `config`
    pub fn from_config(config: &RunnerConfig) -> Self {
        match config.jitter_seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }

    /// Draw the next random addition, whole milliseconds in `[0, JITTER_WINDOW)`
    pub fn sample(&mut self) -> Duration {
        let window_ms = JITTER_WINDOW.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(0..window_ms))
    }

    /// Pause to take before the next attempt
    pub fn next_delay(&mut self, base: Duration) -> Duration {
        base + self.sample()
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes batches against injected fetch and extract capabilities
///
/// Cheap to share behind an `Arc`; `run` takes `&self` and keeps all per-batch
/// state on its own stack.
#[derive(Clone)]
pub struct BatchRunner {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    config: RunnerConfig,
    options: FetchOptions,
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("fetcher", &self.fetcher.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BatchRunner {
    /// Create a runner
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            config,
            options: FetchOptions::default(),
        }
    }

    /// Runner configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute `request` and return one outcome per attempt
    ///
    /// `attempt_count` and `base_delay` are taken as given; validate them at
    /// the boundary (see [`crate::types::BatchInput::validate`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingLocator`] when `request.locator` is empty. No
    /// fetch is made in that case. Fetch failures never surface here; they are
    /// recorded as failed outcomes.
    pub async fn run(&self, request: &BatchRequest) -> Result<BatchReport> {
        if request.locator.is_empty() {
            return Err(Error::MissingLocator);
        }

        let mut jitter = Jitter::from_config(&self.config);
        let mut results = Vec::with_capacity(request.attempt_count as usize);

        tracing::info!(
            url = %request.locator,
            attempts = request.attempt_count,
            base_delay_ms = request.base_delay.as_millis() as u64,
            fetcher = self.fetcher.name(),
            "Starting batch"
        );

        for attempt in 1..=request.attempt_count {
            if attempt > 1 {
                let pause = jitter.next_delay(request.base_delay);
                tracing::debug!(attempt, delay_ms = pause.as_millis() as u64, "Waiting before attempt");
                tokio::time::sleep(pause).await;
            }

            results.push(self.attempt(attempt, &request.locator).await);
        }

        let report = BatchReport {
            target: request.locator.clone(),
            total_attempts: request.attempt_count,
            results,
        };

        tracing::info!(
            url = %report.target,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch finished"
        );

        Ok(report)
    }

    async fn attempt(&self, attempt: u32, url: &str) -> AttemptOutcome {
        tracing::info!(attempt, url = %url, "Fetch attempt");

        let result = match self.fetcher.fetch(url, &self.options).await {
            Ok(response) => {
                let title = self.extractor.extract(&response.body);
                AttemptResult::Succeeded {
                    status_code: response.status_code,
                    title: if title.is_empty() {
                        NO_TITLE_FALLBACK.to_string()
                    } else {
                        title
                    },
                }
            }
            Err(e) => {
                tracing::warn!(attempt, url = %url, error = %e, "Fetch attempt failed");
                AttemptResult::Failed {
                    error: e.to_string(),
                }
            }
        };

        AttemptOutcome {
            attempt,
            result,
            timestamp: Utc::now(),
        }
    }
}
