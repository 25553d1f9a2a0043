//! Per-market sliding trade windows.
//!
//! Mirrors the sharded `DashMap<MarketKey, Arc<RwLock<Entry>>>` shape
//! used for per-market feed state, but the entry here is a bounded
//! append-only event deque instead of a latest-value snapshot.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use sentinel_core::{MarketKey, TradeEvent, Usd};
use std::collections::VecDeque;
use std::sync::Arc;

/// Prune after this many appends even if no query has run.
const PRUNE_EVERY: u64 = 128;
const ONE_MINUTE: i64 = 60;
const TEN_MINUTES: i64 = 600;
const DEFAULT_IDLE_DROP: i64 = 2 * 3600;

/// Aggregate statistics over the last 60 seconds, per §4.4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneMinuteStats {
    pub total_usd: Usd,
    pub buy_usd: Usd,
    pub buy_txs: u32,
    pub unique_buyers: u32,
}

struct MarketWindow {
    events: VecDeque<TradeEvent>,
    appends_since_prune: u64,
    last_activity: DateTime<Utc>,
}

impl MarketWindow {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            events: VecDeque::new(),
            appends_since_prune: 0,
            last_activity: now,
        }
    }

    /// Drops events older than the 10-minute horizon; anything beyond
    /// that is never queried so there is no reason to retain it.
    fn prune(&mut self, now: DateTime<Utc>) {
        let horizon = now - Duration::seconds(TEN_MINUTES);
        while let Some(front) = self.events.front() {
            if front.timestamp < horizon {
                self.events.pop_front();
            } else {
                break;
            }
        }
        self.appends_since_prune = 0;
    }

    fn push(&mut self, event: TradeEvent) {
        self.last_activity = self.last_activity.max(event.timestamp);
        self.events.push_back(event);
        self.appends_since_prune += 1;
        if self.appends_since_prune >= PRUNE_EVERY {
            self.prune(event.timestamp);
        }
    }

    fn total_since(&self, now: DateTime<Utc>, seconds: i64) -> Usd {
        let horizon = now - Duration::seconds(seconds);
        self.events
            .iter()
            .rev()
            .take_while(|e| e.timestamp >= horizon)
            .fold(Usd::ZERO, |acc, e| acc + e.usd_value)
    }

    fn one_minute(&self, now: DateTime<Utc>) -> OneMinuteStats {
        let horizon = now - Duration::seconds(ONE_MINUTE);
        let mut total_usd = Usd::ZERO;
        let mut buy_usd = Usd::ZERO;
        let mut buy_txs = 0u32;
        let mut buyers = std::collections::HashSet::new();

        for e in self.events.iter().rev().take_while(|e| e.timestamp >= horizon) {
            total_usd = total_usd + e.usd_value;
            if e.is_buy {
                buy_usd = buy_usd + e.usd_value;
                buy_txs += 1;
                if let Some(buyer) = e.buyer {
                    buyers.insert(buyer);
                }
            }
        }

        OneMinuteStats {
            total_usd,
            buy_usd,
            buy_txs,
            unique_buyers: buyers.len() as u32,
        }
    }
}

/// Per-market sliding window store (C5). Each market's events live
/// behind its own lock so one busy market never blocks another.
pub struct WindowStore {
    markets: DashMap<MarketKey, Arc<RwLock<MarketWindow>>>,
    idle_drop: Duration,
}

impl WindowStore {
    pub fn new() -> Self {
        Self {
            markets: DashMap::new(),
            idle_drop: Duration::seconds(DEFAULT_IDLE_DROP),
        }
    }

    pub fn with_idle_drop(idle_drop: Duration) -> Self {
        Self {
            markets: DashMap::new(),
            idle_drop,
        }
    }

    /// Appends a trade event, creating the market's window on first
    /// sight. Events from a single market stream must arrive in
    /// non-decreasing timestamp order (see concurrency notes).
    pub fn record(&self, key: MarketKey, event: TradeEvent) {
        let entry = self
            .markets
            .entry(key)
            .or_insert_with(|| Arc::new(RwLock::new(MarketWindow::new(event.timestamp))));
        entry.write().push(event);
    }

    /// `oneMinute(now)`: buy/sell aggregate over the trailing 60s.
    /// Rebuilds the unique-buyer set fresh on every call; nothing is
    /// cached between queries (see §9 Open Questions).
    pub fn one_minute(&self, key: &MarketKey, now: DateTime<Utc>) -> Option<OneMinuteStats> {
        let entry = self.markets.get(key)?;
        let mut guard = entry.write();
        guard.prune(now);
        Some(guard.one_minute(now))
    }

    /// `tenMinutesTotal(now)`: notional over the trailing 600s.
    pub fn ten_minutes_total(&self, key: &MarketKey, now: DateTime<Utc>) -> Option<Usd> {
        let entry = self.markets.get(key)?;
        let mut guard = entry.write();
        guard.prune(now);
        Some(guard.total_since(now, TEN_MINUTES))
    }

    /// `baselineAvgPerMin(now) = max(0, total10m - total1m) / 9`.
    pub fn baseline_avg_per_min(&self, key: &MarketKey, now: DateTime<Utc>) -> Option<Usd> {
        let entry = self.markets.get(key)?;
        let mut guard = entry.write();
        guard.prune(now);
        let total_10m = guard.total_since(now, TEN_MINUTES);
        let total_1m = guard.total_since(now, ONE_MINUTE);
        let remainder = (total_10m.value() - total_1m.value()).max(0.0);
        Some(Usd::new(remainder / 9.0))
    }

    /// Evicts markets that have had no append for longer than
    /// `idleDropMs` (default 2h).
    pub fn reap_idle(&self, now: DateTime<Utc>) {
        self.markets
            .retain(|_, window| now - window.read().last_activity < self.idle_drop);
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl Default for WindowStore {
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
        MarketKey::new(Chain::Bsc, MarketType::V2, Address::from([1u8; 20]))
    }

    fn ev(now: DateTime<Utc>, secs_ago: i64, usd: f64, is_buy: bool, buyer: Option<Address>) -> TradeEvent {
        TradeEvent::new(now - Duration::seconds(secs_ago), Usd::new(usd), is_buy, buyer)
    }

    #[test]
    fn test_one_minute_excludes_older_events() {
        let store = WindowStore::new();
        let now = Utc::now();
        let k = key();
        store.record(k, ev(now, 500, 100.0, true, Some(Address::from([2u8; 20]))));
        store.record(k, ev(now, 30, 50.0, true, Some(Address::from([3u8; 20]))));

        let stats = store.one_minute(&k, now).unwrap();
        assert_eq!(stats.total_usd, Usd::new(50.0));
        assert_eq!(stats.buy_txs, 1);
        assert_eq!(stats.unique_buyers, 1);
    }

    #[test]
    fn test_ten_minutes_total_includes_full_window() {
        let store = WindowStore::new();
        let now = Utc::now();
        let k = key();
        store.record(k, ev(now, 500, 100.0, true, None));
        store.record(k, ev(now, 30, 50.0, true, None));

        let total = store.ten_minutes_total(&k, now).unwrap();
        assert_eq!(total, Usd::new(150.0));
    }

    #[test]
    fn test_baseline_avg_per_min_matches_formula() {
        let store = WindowStore::new();
        let now = Utc::now();
        let k = key();
        // total10m = 900, total1m = 90 -> (900-90)/9 = 90
        store.record(k, ev(now, 300, 810.0, true, None));
        store.record(k, ev(now, 10, 90.0, true, None));

        let baseline = store.baseline_avg_per_min(&k, now).unwrap();
        assert!((baseline.value() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_never_negative() {
        let store = WindowStore::new();
        let now = Utc::now();
        let k = key();
        store.record(k, ev(now, 5, 1000.0, true, None));

        let baseline = store.baseline_avg_per_min(&k, now).unwrap();
        assert_eq!(baseline.value(), 0.0);
    }

    #[test]
    fn test_unique_buyers_dedupes_same_address() {
        let store = WindowStore::new();
        let now = Utc::now();
        let k = key();
        let buyer = Address::from([9u8; 20]);
        store.record(k, ev(now, 10, 10.0, true, Some(buyer)));
        store.record(k, ev(now, 5, 10.0, true, Some(buyer)));

        let stats = store.one_minute(&k, now).unwrap();
        assert_eq!(stats.buy_txs, 2);
        assert_eq!(stats.unique_buyers, 1);
    }

    #[test]
    fn test_unknown_market_returns_none() {
        let store = WindowStore::new();
        assert!(store.one_minute(&key(), Utc::now()).is_none());
    }

    #[test]
    fn test_reap_idle_evicts_stale_market_only() {
        let store = WindowStore::with_idle_drop(Duration::seconds(60));
        let now = Utc::now();
        let stale = MarketKey::new(Chain::Bsc, MarketType::V2, Address::from([4u8; 20]));
        let fresh = MarketKey::new(Chain::Bsc, MarketType::V2, Address::from([5u8; 20]));
        store.record(stale, ev(now, 120, 10.0, true, None));
        store.record(fresh, ev(now, 5, 10.0, true, None));

        store.reap_idle(now);

        assert!(store.one_minute(&stale, now).is_none());
        assert!(store.one_minute(&fresh, now).is_some());
    }

    #[test]
    fn test_prune_runs_eagerly_every_128_appends() {
        let store = WindowStore::new();
        let base = Utc::now() - Duration::seconds(1200);
        let k = key();
        for i in 0..130 {
            store.record(
                k,
                TradeEvent::new(base + Duration::seconds(i * 6), Usd::new(1.0), true, None),
            );
        }
        // Old events beyond the 10-minute horizon should already have
        // been pruned by the batched-every-128 cadence, not just on query.
        let entry = store.markets.get(&k).unwrap();
        assert!(entry.read().events.len() < 130);
    }
}
