//! Exponential backoff with optional jitter.

use std::time::Duration;

use rand::Rng;

use crate::resilience::retries::RetryPolicy;

/// Delay to wait after `failed_attempts` attempts have failed.
///
/// The delay before attempt `n` (n >= 2) is
/// `base_delay * backoff_multiplier^(n - 2)`, capped at `max_delay`.
pub fn calculate_backoff(failed_attempts: u32, policy: &RetryPolicy) -> Duration {
    if failed_attempts == 0 {
        return Duration::from_millis(0);
    }

    let exponent = i32::try_from(failed_attempts - 1).unwrap_or(i32::MAX);
    let base_ms = policy.base_delay.as_millis() as f64;
    let mut delay_ms = (base_ms * policy.backoff_multiplier.powi(exponent)).round();

    if let Some(max) = policy.max_delay {
        delay_ms = delay_ms.min(max.as_millis() as f64);
    }
    // `as` saturates, so an overflowing power still lands on u64::MAX
    let capped_delay = delay_ms as u64;

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if policy.jitter && jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}
