//! Per-client cap on concurrently running batches
//!
//! A batch keeps its request open until the last attempt has finished, so a
//! client can pin the server with a handful of calls. Each client IP gets a
//! counter of running batches. A [`BatchPermit`] holds one slot and gives it
//! back on drop, including when the client disconnects mid-batch. Counters
//! that fall to zero are removed, so idle clients leave nothing behind.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::config::BatchLimitConfig;
use crate::error::Error;

/// Tracks running batches per client IP
pub struct BatchLimiter {
    // std mutex: released from `Drop`, never held across an await
    in_flight: Mutex<HashMap<IpAddr, u32>>,
    config: BatchLimitConfig,
}

impl std::fmt::Debug for BatchLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLimiter")
            .field("config", &self.config)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

impl BatchLimiter {
    /// Create a limiter from configuration
    pub fn new(config: BatchLimitConfig) -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn counters(&self) -> MutexGuard<'_, HashMap<IpAddr, u32>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim a slot for `ip`
    ///
    /// # Errors
    ///
    /// [`Error::TooManyBatches`] when `ip` already runs its maximum.
    pub fn try_acquire(self: &Arc<Self>, ip: IpAddr) -> Result<BatchPermit, Error> {
        if self.config.exempt_ips.contains(&ip) {
            return Ok(BatchPermit {
                limiter: Arc::clone(self),
                ip: None,
            });
        }

        let limit = self.config.max_in_flight_per_ip;
        let mut counters = self.counters();
        let running = counters.entry(ip).or_insert(0);
        if *running >= limit {
            // Never leave a zero entry behind on rejection
            if *running == 0 {
                counters.remove(&ip);
            }
            return Err(Error::TooManyBatches { limit });
        }
        *running += 1;

        Ok(BatchPermit {
            limiter: Arc::clone(self),
            ip: Some(ip),
        })
    }

    /// Batches currently running for `ip`
    pub fn in_flight(&self, ip: IpAddr) -> u32 {
        self.counters().get(&ip).copied().unwrap_or(0)
    }

    /// Number of client IPs with at least one running batch
    pub fn tracked_clients(&self) -> usize {
        self.counters().len()
    }

    fn release(&self, ip: IpAddr) {
        let mut counters = self.counters();
        if let Some(running) = counters.get_mut(&ip) {
            *running = running.saturating_sub(1);
            if *running == 0 {
                counters.remove(&ip);
            }
        }
    }
}

/// One claimed slot; released on drop
#[derive(Debug)]
pub struct BatchPermit {
    limiter: Arc<BatchLimiter>,
    // None for exempt clients, which are not counted
    ip: Option<IpAddr>,
}

impl Drop for BatchPermit {
    fn drop(&mut self) {
        if let Some(ip) = self.ip {
            self.limiter.release(ip);
        }
    }
}

/// Middleware for the batch route: hold a permit for the whole request
pub async fn batch_limit_middleware(
    State(limiter): State<Arc<BatchLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let _permit = match limiter.try_acquire(addr.ip()) {
        Ok(permit) => permit,
        Err(e) => {
            tracing::warn!(client = %addr, error = %e, "Batch rejected");
            return e.into_response();
        }
    };

    next.run(req).await
}
