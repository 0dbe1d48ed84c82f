//! Per-attempt timeout enforcement.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Run `fut` with a deadline; on expiry the future is dropped and
/// `ApiError::Timeout` is returned.
pub async fn with_timeout<F, T>(duration: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_slow_future_times_out() {
        let result: Result<(), ApiError> = with_timeout(Duration::from_millis(100), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ApiError::Timeout(d)) if d == Duration::from_millis(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_inner_error_passes_through() {
        let result: Result<(), ApiError> = with_timeout(Duration::from_secs(1), async {
            Err(ApiError::Network("connection refused".into()))
        })
        .await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
