//! Retry with exponential back-off and jitter for the upstream clients.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (timeouts, transport failures, 5xx). Client errors and
//! malformed bodies are returned on first occurrence.

use std::future::Future;
use std::time::Duration;

use tikboard_core::Upstream;

use crate::error::UpstreamError;

/// Upper bound of a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &UpstreamError) -> bool {
    err.kind().is_transient()
}

/// Delay before retry number `attempt` (1-based), before jitter is applied.
pub(crate) fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    let exponent = attempt.saturating_sub(1).min(20);
    backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Retry | Sleep before it                 |
/// |-------|---------------------------------|
/// | 1     | 1 000 ms × 2⁰ ± 25 % jitter    |
/// | 2     | 1 000 ms × 2¹ ± 25 % jitter    |
/// | 3     | 1 000 ms × 2² ± 25 % jitter    |
///
/// Delay is capped at 30 s. When retries run out the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    upstream: Upstream,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
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
                let capped = backoff_delay_ms(backoff_base_ms, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    upstream = %upstream,
                    attempt,
                    max_retries,
                    delay_ms,
                    kind = %err.kind(),
                    error = %err,
                    "transient upstream error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
