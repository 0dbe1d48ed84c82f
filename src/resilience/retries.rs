//! Retry logic.
//!
//! # Responsibilities
//! - Classify failures as transient or permanent
//! - Re-run idempotent calls with exponential backoff
//! - Stop immediately on cancellation
//!
//! # Design Decisions
//! - Idempotency is declared by the caller per call, never inferred from the method
//! - Connection errors and timeouts always retryable; statuses configurable
//! - `Retry-After` on 429 stretches the delay, never shortens it

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{ApiError, ClientError};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::cancellation::CancelScope;

/// Immutable retry policy, built once per client.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Option<Duration>,
    pub retryable_status_codes: BTreeSet<u16>,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: if config.enabled {
                config.max_attempts.max(1)
            } else {
                1
            },
            base_delay: Duration::from_millis(config.base_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_delay: config.max_delay_ms.map(Duration::from_millis),
            retryable_status_codes: config.retryable_status_codes.iter().copied().collect(),
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Default classification of a failure.
    pub fn is_retryable(&self, err: &ApiError) -> bool {
        match err {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Http { status, .. } => self.retryable_status_codes.contains(status),
            ApiError::Cancelled | ApiError::Validation(_) | ApiError::InvalidRequest(_) => false,
        }
    }

    /// Delay before the next attempt after `failed_attempts` failures.
    pub fn delay_after(&self, failed_attempts: u32, err: &ApiError) -> Duration {
        let backoff = calculate_backoff(failed_attempts, self);
        let delay = match err {
            ApiError::Http {
                status: 429,
                retry_after: Some(retry_after),
                ..
            } => backoff.max(*retry_after),
            _ => backoff,
        };
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

/// Caller-supplied override of the retry classification.
pub type RetryCondition = Arc<dyn Fn(&ApiError) -> bool + Send + Sync>;

/// Value produced by a retried operation and the attempts it took.
#[derive(Debug)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Drives an operation through the retry policy.
#[derive(Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    condition: Option<RetryCondition>,
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: RetryCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn should_retry(&self, err: &ApiError) -> bool {
        if matches!(err, ApiError::Cancelled) {
            return false;
        }
        match &self.condition {
            Some(condition) => condition(err),
            None => self.policy.is_retryable(err),
        }
    }

    /// Run `op` until it succeeds, fails permanently, runs out of attempts,
    /// or `scope` is cancelled. `op` receives the 1-based attempt number.
    ///
    /// Non-idempotent calls get exactly one attempt.
    pub async fn run<F, Fut, T>(
        &self,
        method: &'static str,
        idempotent: bool,
        scope: &CancelScope,
        mut op: F,
    ) -> Result<Attempted<T>, ClientError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let max_attempts = if idempotent { self.policy.max_attempts } else { 1 };
        let mut attempt = 0;

        loop {
            if scope.is_cancelled() {
                return Err(ClientError::new(ApiError::Cancelled, attempt));
            }
            attempt += 1;
            metrics::record_attempt(method);

            let err = match scope.run(op(attempt)).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(attempts = attempt, "Request succeeded after retry");
                    }
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };

            if attempt >= max_attempts || !self.should_retry(&err) {
                if attempt > 1 {
                    tracing::warn!(attempts = attempt, error = %err, "Giving up after retries");
                }
                return Err(ClientError::new(err, attempt));
            }

            let delay = self.policy.delay_after(attempt, &err);
            tracing::info!(attempt, delay = ?delay, error = %err, "Retrying request");
            metrics::record_retry(metrics::outcome_label(&err));

            let slept = scope
                .run(async {
                    tokio::time::sleep(delay).await;
                    Ok(())
                })
                .await;
            if slept.is_err() {
                return Err(ClientError::new(ApiError::Cancelled, attempt));
            }
        }
    }
}

impl fmt::Debug for Retrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .field("custom_condition", &self.condition.is_some())
            .finish()
    }
}
