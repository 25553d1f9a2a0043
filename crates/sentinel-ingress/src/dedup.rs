//! Time-boxed dedup set for the trending poller (§4.1 filter 5, §8
//! "Dedup TTL" invariant).
//!
//! Shaped after `sentinel-pricing`'s `PriceOracle` cache: a `DashMap`
//! entry with a fetch timestamp, freshness checked against a fixed
//! TTL rather than evicted eagerly.

use dashmap::DashMap;
use sentinel_core::{Chain, MarketKey};
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Tracks the last time a `(chain, pair)` candidate was emitted by the
/// trending poller, so the same pair isn't re-admitted every tick.
pub struct TrendingDedup {
    seen: DashMap<MarketKey, Instant>,
    ttl: Duration,
}

impl TrendingDedup {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            seen: DashMap::new(),
            ttl,
        }
    }

    /// Returns `true` and records the sighting if `key` hasn't been
    /// seen within the TTL; returns `false` (and does not reset the
    /// timer) if it was seen recently.
    pub fn admit(&self, key: MarketKey) -> bool {
        let now = Instant::now();
        if let Some(seen_at) = self.seen.get(&key) {
            if now.duration_since(*seen_at) < self.ttl {
                return false;
            }
        }
        self.seen.insert(key, now);
        true
    }

    /// Drops entries whose TTL has fully elapsed, bounding memory use
    /// across a long-running process.
    pub fn sweep(&self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.seen.retain(|_, seen_at| now.duration_since(*seen_at) < ttl);
    }
}

impl Default for TrendingDedup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use sentinel_core::MarketType;

    fn key() -> MarketKey {
        MarketKey::new(Chain::Bsc, MarketType::V2, Address::from([1u8; 20]))
    }

    #[test]
    fn test_first_sighting_is_admitted() {
        let dedup = TrendingDedup::new();
        assert!(dedup.admit(key()));
    }

    #[test]
    fn test_second_sighting_within_ttl_is_rejected() {
        let dedup = TrendingDedup::new();
        assert!(dedup.admit(key()));
        assert!(!dedup.admit(key()));
    }

    #[test]
    fn test_sighting_past_ttl_is_admitted_again() {
        let dedup = TrendingDedup::with_ttl(Duration::from_millis(10));
        assert!(dedup.admit(key()));
        std::thread::sleep(Duration::from_millis(20));
        assert!(dedup.admit(key()));
    }

    #[test]
    fn test_sweep_drops_expired_entries() {
        let dedup = TrendingDedup::with_ttl(Duration::from_millis(10));
        dedup.admit(key());
        std::thread::sleep(Duration::from_millis(20));
        dedup.sweep();
        assert!(dedup.seen.is_empty());
    }
}
