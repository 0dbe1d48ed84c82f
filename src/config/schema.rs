//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML and every
//! field has a default, so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the API client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL, including any path prefix (e.g. "http://localhost:3333/api").
    pub base_url: String,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent header value.
    pub user_agent: String,

    /// Drop the stored access token when the server answers 401.
    pub clear_token_on_unauthorized: bool,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,

    /// Retry configuration.
    pub retry: RetryConfig,

    /// Response cache configuration.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3333/api".to_string(),
            timeout_ms: 30_000,
            user_agent: format!("fayol-client/{}", env!("CARGO_PKG_VERSION")),
            clear_token_on_unauthorized: true,
            use_system_proxy: true,
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries. When disabled every call gets a single attempt.
    pub enabled: bool,

    /// Total attempts including the first one.
    pub max_attempts: u32,

    /// Delay before the second attempt in milliseconds.
    pub base_delay_ms: u64,

    /// Growth factor applied to the delay for each further attempt.
    pub backoff_multiplier: f64,

    /// Upper bound for a single delay in milliseconds.
    pub max_delay_ms: Option<u64>,

    /// HTTP statuses treated as transient.
    pub retryable_status_codes: Vec<u16>,

    /// Add 0-10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 4,
            base_delay_ms: 1_000,
            backoff_multiplier: 2.0,
            max_delay_ms: Some(30_000),
            retryable_status_codes: vec![429, 500, 502, 503, 504],
            jitter: false,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the response cache for cacheable reads.
    pub enabled: bool,

    /// TTL for entries whose request does not set one, in milliseconds.
    pub default_ttl_ms: u64,

    /// Interval of the background sweep of expired entries (0 disables).
    pub cleanup_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_ms: 5 * 60 * 1_000,
            cleanup_interval_ms: 60_000,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
