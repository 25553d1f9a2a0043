//! Rate limiting for outbound RPC calls.
//!
//! Implements token bucket rate limiting to stay under a node
//! provider's request-per-window limits when probing many markets.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Token bucket rate limiter.
pub struct RateLimiter {
    max_calls: u32,
    window_secs: u64,
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_calls: u32, window_secs: u64) -> Self {
        Self {
            max_calls,
            window_secs,
            timestamps: Arc::new(Mutex::new(VecDeque::with_capacity(max_calls as usize))),
        }
    }

    pub fn can_send(&self) -> bool {
        self.cleanup_old_timestamps();
        self.timestamps.lock().len() < self.max_calls as usize
    }

    pub fn record_send(&self) {
        self.cleanup_old_timestamps();
        let mut timestamps = self.timestamps.lock();
        timestamps.push_back(Instant::now());
        if timestamps.len() >= self.max_calls as usize {
            warn!(count = timestamps.len(), max = self.max_calls, "approaching RPC rate limit");
        }
    }

    pub fn current_count(&self) -> u32 {
        self.cleanup_old_timestamps();
        self.timestamps.lock().len() as u32
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.max_calls.saturating_sub(self.current_count())
    }

    /// Waits until a call can be made, then records it.
    pub async fn wait_for_capacity(&self) {
        while !self.can_send() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.record_send();
    }

    fn cleanup_old_timestamps(&self) {
        let window = Duration::from_secs(self.window_secs);
        let cutoff = Instant::now() - window;
        let mut timestamps = self.timestamps.lock();
        while timestamps.front().is_some_and(|&t| t < cutoff) {
            timestamps.pop_front();
        }
    }

    pub fn reset(&self) {
        self.timestamps.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_basic() {
        let limiter = RateLimiter::new(10, 60);

        assert!(limiter.can_send());
        assert_eq!(limiter.current_count(), 0);

        for _ in 0..5 {
            limiter.record_send();
        }

        assert!(limiter.can_send());
        assert_eq!(limiter.current_count(), 5);
        assert_eq!(limiter.remaining_capacity(), 5);
    }

    #[test]
    fn test_rate_limiter_at_limit() {
        let limiter = RateLimiter::new(5, 60);

        for _ in 0..5 {
            limiter.record_send();
        }

        assert!(!limiter.can_send());
        assert_eq!(limiter.remaining_capacity(), 0);
    }
}
