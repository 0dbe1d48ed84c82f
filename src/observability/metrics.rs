//! Client metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host application installs a recorder.
//!
//! # Metrics
//! - `fayol_client_requests_total` (counter): logical calls by method, outcome
//! - `fayol_client_request_duration_seconds` (histogram): end-to-end latency
//! - `fayol_client_attempts_total` (counter): transport attempts by method
//! - `fayol_client_retries_total` (counter): retries by reason
//! - `fayol_client_cache_hits_total` / `fayol_client_cache_misses_total`
//! - `fayol_client_cache_invalidations_total` (counter): entries removed
//! - `fayol_client_cache_entries` (gauge): current store size

use std::time::Instant;

use crate::error::ApiError;

/// Record a finished logical call.
pub fn record_request(method: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!("fayol_client_requests_total", "method" => method, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("fayol_client_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_attempt(method: &'static str) {
    metrics::counter!("fayol_client_attempts_total", "method" => method).increment(1);
}

pub fn record_retry(reason: &'static str) {
    metrics::counter!("fayol_client_retries_total", "reason" => reason).increment(1);
}

pub fn record_cache_hit() {
    metrics::counter!("fayol_client_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    metrics::counter!("fayol_client_cache_misses_total").increment(1);
}

pub fn record_cache_invalidation(removed: usize) {
    metrics::counter!("fayol_client_cache_invalidations_total").increment(removed as u64);
}

pub fn record_cache_size(size: usize) {
    metrics::gauge!("fayol_client_cache_entries").set(size as f64);
}

/// Short label for an error kind.
pub fn outcome_label(err: &ApiError) -> &'static str {
    match err {
        ApiError::Network(_) => "network",
        ApiError::Timeout(_) => "timeout",
        ApiError::Http { status, .. } if *status >= 500 => "http_5xx",
        ApiError::Http { status: 429, .. } => "http_429",
        ApiError::Http { .. } => "http_4xx",
        ApiError::Cancelled => "cancelled",
        ApiError::Validation(_) => "validation",
        ApiError::InvalidRequest(_) => "invalid_request",
    }
}
