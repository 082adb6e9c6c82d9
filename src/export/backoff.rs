//! Exponential backoff for polling operations.

use crate::error::{HarvestError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Number of attempts before giving up.
const MAX_RETRIES: u32 = 5;

/// Retries an async operation with exponential backoff.
///
/// The operation signals "not yet" by returning `None`. After every failed
/// attempt, including the final one, this sleeps `2^attempt` seconds
/// (1, 2, 4, 8, 16). Once all attempts are spent the result is a
/// `RetriesExceeded` error.
pub async fn retry_with_backoff<T, F, Fut>(mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 0..MAX_RETRIES {
        if let Some(value) = op().await {
            return Ok(value);
        }

        let delay = Duration::from_secs(1 << attempt);
        warn!(
            "Attempt {} failed, retrying in {} seconds",
            attempt + 1,
            delay.as_secs()
        );
        tokio::time::sleep(delay).await;
    }

    Err(HarvestError::RetriesExceeded(MAX_RETRIES))
}
