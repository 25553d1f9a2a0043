//! Generic exponential backoff for RPC calls and subscriptions.
//!
//! Shared by the aggregator's HTTP client and this crate's subscription
//! watchers so reconnect/retry pacing is identical across both.

use std::time::Duration;
use tracing::warn;

/// Backoff configuration: base delay, cap, and jitter ceiling.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: 0,
        }
    }
}

impl BackoffConfig {
    /// Delay before the given attempt (1-indexed), exponential with a
    /// cap and 0-1000ms jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exponent);
        let delay = delay.min(self.max_delay_ms);
        Duration::from_millis(delay + jitter_ms())
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts > 0 && attempt >= self.max_attempts
    }
}

fn jitter_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as u64
}

/// Retries `op` with exponential backoff until it succeeds or the
/// configured attempt budget is exhausted. `op_name` is used only for
/// the warning log emitted on each failed attempt.
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: &BackoffConfig,
    op_name: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if config.exhausted(attempt) {
                    return Err(e);
                }
                let delay = config.delay_for(attempt);
                warn!(op = op_name, attempt, delay_ms = delay.as_millis(), error = %e, "retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
