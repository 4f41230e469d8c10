//! Bounded store calls.

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Awaits a store operation for at most `limit`.
///
/// # Errors
///
/// Returns [`AppError::StoreUnavailable`] when the limit elapses, otherwise
/// whatever the operation returned.
pub async fn with_timeout<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store call timed out"
            );
            Err(AppError::store_unavailable(format!(
                "{operation} timed out after {}ms",
                limit.as_millis()
            )))
        }
    }
}
