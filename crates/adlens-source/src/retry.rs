//! Retry with exponential back-off and jitter for the ad library client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx) and on rate limiting. A
//! `Retry-After` hint from the server is honored when it is longer than the
//! computed back-off.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, rate limiting.
///
/// **Not retriable:** Graph API errors, other 4xx statuses, malformed bodies
/// and invalid requests. Retrying won't fix them.
pub(crate) fn is_retriable(err: &SourceError) -> bool {
    match err {
        SourceError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SourceError::RateLimited { .. } => true,
        SourceError::ApiError { .. }
        | SourceError::Deserialize { .. }
        | SourceError::InvalidRequest(_) => false,
    }
}

/// Delay before retry number `attempt` (1-based).
///
/// `jitter` is a factor in `[0.75, 1.25)`. Capped at 60 s, except that a
/// server `Retry-After` is honored up to the same cap even when it exceeds
/// the jittered value.
pub(crate) fn backoff_delay(
    attempt: u32,
    backoff_base_ms: u64,
    err: &SourceError,
    jitter: f64,
) -> Duration {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * jitter) as u64;

    let server_hint = match err {
        SourceError::RateLimited {
            retry_after_secs: Some(secs),
        } => secs.saturating_mul(1_000).min(MAX_DELAY_MS),
        _ => 0,
    };
    Duration::from_millis(jittered.max(server_hint))
}

/// Runs `operation` with up to `max_retries` additional attempts on retriable errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Attempt | Sleep before next attempt        |
/// |---------|----------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter     |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter     |
/// | 3       | 1 000 ms × 2² ± 25 % jitter     |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let jitter = rand::random::<f64>() * 0.5 + 0.75;
                let delay = backoff_delay(attempt, backoff_base_ms, &err, jitter);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    rate_limited = err.is_rate_limited(),
                    error = %err,
                    "ad library request failed, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
