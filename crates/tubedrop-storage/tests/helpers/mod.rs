//! Shared helpers for storage integration tests.

use std::future::Future;
use std::time::Duration;

/// Call `op` until it succeeds or `attempts` runs out, sleeping `delay`
/// between tries. Returns the last error on exhaustion.
pub async fn retry_with_sleep<T, E, F, Fut>(attempts: usize, delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut remaining = attempts.max(1);
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if remaining <= 1 => return Err(e),
            Err(_) => {
                remaining -= 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
