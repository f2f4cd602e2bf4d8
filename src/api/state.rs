//! Application state for the API server

use crate::{BatchRunner, Config};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request (two Arc clones). Holds nothing mutable, so concurrent
/// batches never contend.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Runner that executes batches
    pub runner: Arc<BatchRunner>,

    /// Configuration (limits are applied to every inbound payload)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(runner: Arc<BatchRunner>, config: Arc<Config>) -> Self {
        Self { runner, config }
    }
}
