//! Async utilities

use crate::error::{ErrorContext, GymTrackError, GymTrackResult};
use tokio::time::{timeout, Duration};
use tracing::warn;

/// Timeout wrapper for async operations
pub async fn with_timeout<F, T>(future: F, timeout_ms: u64, operation_name: &str) -> GymTrackResult<T>
where
    F: std::future::Future<Output = T>,
{
    match timeout(Duration::from_millis(timeout_ms), future).await {
        Ok(result) => Ok(result),
        Err(_) => {
            warn!(
                operation = operation_name,
                timeout_ms = timeout_ms,
                "Operation timed out"
            );
            Err(GymTrackError::Timeout {
                operation: operation_name.to_string(),
                duration_ms: timeout_ms,
                context: ErrorContext::new("async_utils")
                    .with_operation("timeout")
                    .with_metadata("timeout_ms", &timeout_ms.to_string())
                    .with_suggestion("Check network connectivity")
                    .with_suggestion("Increase client.request_timeout_ms"),
            })
        }
    }
}

/// Like [`with_timeout`] for futures that already return a `GymTrackResult`
pub async fn with_timeout_flatten<F, T>(
    future: F,
    timeout_ms: u64,
    operation_name: &str,
) -> GymTrackResult<T>
where
    F: std::future::Future<Output = GymTrackResult<T>>,
{
    with_timeout(future, timeout_ms, operation_name).await?
}
