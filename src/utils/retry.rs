use std::future::Future;
use std::time::Duration;

/// Runs `f` up to `attempts` times, sleeping `delay` between failures.
///
/// `should_retry` decides whether a given error is worth another attempt;
/// the first non-retryable error is returned immediately.
pub async fn retry_async<F, Fut, T, E, R>(
    mut f: F,
    attempts: u32,
    delay: Duration,
    should_retry: R,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match f(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && should_retry(&e) => {
                tracing::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
