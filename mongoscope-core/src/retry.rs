//! Bounded retry with exponential backoff for transient database errors.

use crate::config::RetryPolicy;
use crate::error::SourceError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Runs `op`, retrying transient failures up to the policy's attempt bound.
///
/// Backoff doubles per retry (capped) with up to 100ms of jitter. Permission
/// errors and other non-transient failures are returned immediately; retry
/// never applies to them.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt) + jitter();
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    what,
                    attempt,
                    policy.max_attempts,
                    delay,
                    error
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..100))
}
