//! Configuration types for repeat-fetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    path::Path,
};
use utoipa::ToSchema;

/// Main configuration
///
/// Every field has a default, so an empty TOML file (or `Config::default()`)
/// gives a working server on `127.0.0.1:3001`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ApiConfig,

    /// Bounds and defaults applied to inbound batch payloads
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Batch runner settings
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;

        let config: Config = toml::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse '{}': {}", path.display(), e),
            key: None,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check that bounds are ordered and defaults sit inside them
    pub fn validate(&self) -> Result<()> {
        let l = &self.limits;

        if l.min_count == 0 {
            return Err(config_error("min_count must be at least 1", "limits.min_count"));
        }
        if l.min_count > l.max_count {
            return Err(config_error(
                "min_count must not exceed max_count",
                "limits.min_count",
            ));
        }
        if l.min_delay_ms > l.max_delay_ms {
            return Err(config_error(
                "min_delay_ms must not exceed max_delay_ms",
                "limits.min_delay_ms",
            ));
        }
        if !(l.min_count..=l.max_count).contains(&l.default_count) {
            return Err(config_error(
                "default_count must lie within [min_count, max_count]",
                "limits.default_count",
            ));
        }
        if !(l.min_delay_ms..=l.max_delay_ms).contains(&l.default_delay_ms) {
            return Err(config_error(
                "default_delay_ms must lie within [min_delay_ms, max_delay_ms]",
                "limits.default_delay_ms",
            ));
        }
        if self.server.batch_limit.enabled && self.server.batch_limit.max_in_flight_per_ip == 0 {
            return Err(config_error(
                "max_in_flight_per_ip must be at least 1 when the batch limit is enabled",
                "server.batch_limit.max_in_flight_per_ip",
            ));
        }

        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3001)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Serve the browser form at / (default: true)
    #[serde(default = "default_true")]
    pub ui_enabled: bool,

    /// Per-client cap on concurrently running batches
    #[serde(default)]
    pub batch_limit: BatchLimitConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            ui_enabled: true,
            batch_limit: BatchLimitConfig::default(),
        }
    }
}

/// Cap on how many batches one client IP may have running at once
///
/// A batch holds its connection open for the whole run (up to ~20 minutes at
/// the largest count and delay), so the budget is on concurrent batches
/// rather than on request rate.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchLimitConfig {
    /// Enforce the cap (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Batches a single IP may run concurrently (default: 2)
    #[serde(default = "default_max_in_flight_per_ip")]
    pub max_in_flight_per_ip: u32,

    /// IPs never limited (default: loopback)
    #[serde(default = "default_exempt_ips")]
    #[schema(value_type = Vec<String>)]
    pub exempt_ips: Vec<IpAddr>,
}

impl Default for BatchLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_in_flight_per_ip: default_max_in_flight_per_ip(),
            exempt_ips: default_exempt_ips(),
        }
    }
}

/// Bounds and defaults for inbound `count` / `delay`
///
/// Out-of-range values are clamped, not rejected.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LimitsConfig {
    /// Attempt count used when the payload omits `count` (default: 1)
    #[serde(default = "default_count")]
    pub default_count: u32,

    /// Base delay used when the payload omits `delay` (default: 1000)
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: u64,

    /// Smallest accepted attempt count (default: 1)
    #[serde(default = "default_min_count")]
    pub min_count: u32,

    /// Largest accepted attempt count (default: 100)
    #[serde(default = "default_max_count")]
    pub max_count: u32,

    /// Smallest accepted base delay in milliseconds (default: 500)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Largest accepted base delay in milliseconds (default: 10000)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            default_delay_ms: default_delay_ms(),
            min_count: default_min_count(),
            max_count: default_max_count(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Batch runner configuration
///
/// The jitter window itself is fixed (see [`crate::runner::JITTER_WINDOW`]);
/// only its randomness source is configurable.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Seed for the jitter generator
    ///
    /// When set, every batch replays the same jitter sequence. When unset,
    /// each batch seeds from OS entropy.
    #[serde(default)]
    pub jitter_seed: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3001))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_in_flight_per_ip() -> u32 {
    2
}

fn default_exempt_ips() -> Vec<IpAddr> {
    vec![
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(Ipv6Addr::LOCALHOST),
    ]
}

fn default_count() -> u32 {
    1
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_min_count() -> u32 {
    1
}

fn default_max_count() -> u32 {
    100
}

fn default_min_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}
