//! Provider Call Timeouts
//!
//! Bounds every suspension point in the suggestion pipeline. Provider calls
//! are the only operations that wait on the network, so they are wrapped
//! here in addition to the HTTP client's own timeout.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let content = with_timeout(
//!     Duration::from_secs(30),
//!     provider.call(prompt),
//!     "groq completion",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{EstimateError, Result};

/// Execute an async operation with a timeout
///
/// Returns `EstimateError::Timeout` if the operation doesn't complete within
/// `timeout`. The inner future is dropped on expiry.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(EstimateError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, EstimateError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, EstimateError>(42)
            },
            "slow completion",
        )
        .await;
        let err = result.unwrap_err();
        assert!(matches!(err, EstimateError::Timeout { .. }));
        assert!(err.to_string().contains("slow completion"));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_inner_error() {
        let result: Result<()> = with_timeout(
            Duration::from_secs(1),
            async { Err(EstimateError::input("bad")) },
            "test operation",
        )
        .await;
        assert!(matches!(result, Err(EstimateError::Input(_))));
    }
}
