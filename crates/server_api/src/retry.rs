use std::{future::Future, time::Duration};

use anyhow::{anyhow, Result};
use tracing::warn;

pub const RETRY_ATTEMPTS: u32 = 3;
pub const RETRY_INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Runs a persistence call up to [`RETRY_ATTEMPTS`] times with exponential
/// backoff, starting at [`RETRY_INITIAL_BACKOFF`] and doubling per attempt.
/// Exhausting the attempts surfaces the last error.
pub async fn with_retry<T, F, Fut>(label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = RETRY_INITIAL_BACKOFF;
    let mut last_error = None;

    for attempt in 1..=RETRY_ATTEMPTS {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                warn!(label, attempt, %error, "persistence call failed");
                last_error = Some(error);
                if attempt < RETRY_ATTEMPTS {
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("retry loop for '{label}' made no attempts")))
}
