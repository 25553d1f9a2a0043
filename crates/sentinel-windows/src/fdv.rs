//! Per-token fully-diluted-valuation history (C6).
//!
//! Keeps a short rolling history of FDV snapshots per market so the
//! alert evaluator can ask "how much higher is FDV now than it was a
//! few minutes ago" without re-deriving supply/price every tick.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use sentinel_core::{MarketKey, Usd};
use std::collections::VecDeque;

const RETENTION: i64 = 15 * 60;

#[derive(Debug, Clone, Copy)]
struct Sample {
    timestamp: DateTime<Utc>,
    fdv: Usd,
}

struct History {
    samples: VecDeque<Sample>,
}

impl History {
    fn new() -> Self {
        Self {
            samples: VecDeque::new(),
        }
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let horizon = now - Duration::seconds(RETENTION);
        while let Some(front) = self.samples.front() {
            if front.timestamp < horizon {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Tracks FDV snapshots per market over a 15-minute retention window.
pub struct FdvTracker {
    histories: DashMap<MarketKey, RwLock<History>>,
}

impl FdvTracker {
    pub fn new() -> Self {
        Self {
            histories: DashMap::new(),
        }
    }

    /// Records a new FDV sample for `key` at `now`.
    pub fn push(&self, key: MarketKey, fdv: Usd, now: DateTime<Utc>) {
        let entry = self.histories.entry(key).or_insert_with(|| RwLock::new(History::new()));
        let mut guard = entry.write();
        guard.prune(now);
        guard.samples.push_back(Sample { timestamp: now, fdv });
    }

    /// Ratio of the current `fdv` to the oldest sample at least
    /// `min_age` old (and still within retention). `None` if no
    /// qualifying past sample exists, or the past sample is zero.
    pub fn ratio_since(
        &self,
        key: &MarketKey,
        current: Usd,
        min_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<f64> {
        let entry = self.histories.get(key)?;
        let mut guard = entry.write();
        guard.prune(now);
        let cutoff = now - min_age;
        let past = guard
            .samples
            .iter()
            .find(|s| s.timestamp <= cutoff)
            .map(|s| s.fdv)?;
        current.ratio_to(past)
    }
}

impl Default for FdvTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use sentinel_core::{Chain, MarketType};

    fn key() -> MarketKey {
        MarketKey::new(Chain::Eth, MarketType::V3, Address::from([6u8; 20]))
    }

    #[test]
    fn test_ratio_since_reflects_multiplier() {
        let tracker = FdvTracker::new();
        let now = Utc::now();
        let k = key();
        tracker.push(k, Usd::new(100_000.0), now - Duration::seconds(200));

        let ratio = tracker
            .ratio_since(&k, Usd::new(300_000.0), Duration::seconds(180), now)
            .unwrap();
        assert!((ratio - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_since_none_without_old_enough_sample() {
        let tracker = FdvTracker::new();
        let now = Utc::now();
        let k = key();
        tracker.push(k, Usd::new(100_000.0), now - Duration::seconds(10));

        let ratio = tracker.ratio_since(&k, Usd::new(300_000.0), Duration::seconds(180), now);
        assert!(ratio.is_none());
    }

    #[test]
    fn test_prune_drops_samples_past_retention() {
        let tracker = FdvTracker::new();
        let now = Utc::now();
        let k = key();
        tracker.push(k, Usd::new(1.0), now - Duration::seconds(RETENTION + 60));

        let ratio = tracker.ratio_since(&k, Usd::new(2.0), Duration::seconds(0), now);
        assert!(ratio.is_none());
    }
}
