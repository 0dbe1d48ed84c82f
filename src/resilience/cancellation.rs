//! Caller-driven cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

/// Per-call options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Cancelling the token aborts the in-flight attempt and any backoff.
    pub cancel: Option<CancellationToken>,
    /// Overall budget for the call, across all attempts and delays.
    pub deadline: Option<Duration>,
}

impl CallOptions {
    pub fn with_cancel(token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            deadline: None,
        }
    }

    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            cancel: None,
            deadline: Some(deadline),
        }
    }
}

/// Cancellation state of one in-flight call.
#[derive(Debug)]
pub struct CancelScope {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CancelScope {
    pub fn new(options: &CallOptions) -> Self {
        Self {
            token: options.cancel.clone(),
            deadline: options.deadline.map(|d| Instant::now() + d),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        let token_fired = self.token.as_ref().is_some_and(|t| t.is_cancelled());
        let deadline_passed = self.deadline.is_some_and(|d| Instant::now() >= d);
        token_fired || deadline_passed
    }

    /// Resolves once the token fires or the deadline passes; never otherwise.
    pub async fn cancelled(&self) {
        let token = async {
            match &self.token {
                Some(t) => t.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = token => {}
            _ = deadline => {}
        }
    }

    /// Race `fut` against cancellation; the loser is dropped.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_uncancelled_scope_passes_through() {
        let scope = CancelScope::new(&CallOptions::default());
        let result = scope.run(async { Ok::<_, ApiError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert!(!scope.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_aborts_future() {
        let token = CancellationToken::new();
        let scope = CancelScope::new(&CallOptions::with_cancel(token.clone()));

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let result: Result<(), ApiError> = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(scope.is_cancelled());
        canceller.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_future() {
        let scope = CancelScope::new(&CallOptions::with_deadline(Duration::from_millis(200)));
        let start = Instant::now();

        let result: Result<(), ApiError> = scope
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200) && elapsed < Duration::from_millis(205));
    }
}
