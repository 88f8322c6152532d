//! Deadlines and transient-failure retry for store calls.

use std::future::Future;
use std::time::Duration;

use crate::core::ParkingError;

/// Bounds applied to every store call made by the lifecycle components.
#[derive(Debug, Clone, Copy)]
pub struct StorePolicy {
    /// Deadline for a single store call.
    pub timeout: Duration,
    /// Extra attempts for read-only calls that fail transiently.
    pub transient_retries: u32,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            transient_retries: 2,
        }
    }
}

impl StorePolicy {
    /// Run one store call under the deadline. Dropping the future on expiry
    /// cancels the call; see [`ParkingStore`](crate::core::ParkingStore) for
    /// what a backend must guarantee about a cancelled call.
    pub(crate) async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, ParkingError>
    where
        F: Future<Output = Result<T, ParkingError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op, timeout_ms = self.timeout.as_millis(), "store call timed out");
                Err(ParkingError::Timeout(op))
            }
        }
    }

    /// Run a read-only store call under the deadline, retrying transient failures.
    pub(crate) async fn bounded_read<T, F, Fut>(
        &self,
        op: &'static str,
        mut call: F,
    ) -> Result<T, ParkingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ParkingError>>,
    {
        let mut attempt = 0;
        loop {
            match self.bounded(op, call()).await {
                Err(err) if err.is_transient() && attempt < self.transient_retries => {
                    attempt += 1;
                    tracing::warn!(op, attempt, error = %err, "retrying read after transient failure");
                }
                other => return other,
            }
        }
    }
}
