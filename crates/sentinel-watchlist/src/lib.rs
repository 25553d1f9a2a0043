//! Per-market lifecycle registry.
//!
//! Owns every [`sentinel_core::Market`] exclusively: candidates are
//! created here by ingress, transitioned by the gate pipeline, mutated
//! in place by market subscribers, and reaped on an idle sweep. Every
//! other component only ever holds a `MarketKey` lookup reference.
//!
//! Shaped after the teacher's `MarketState` (`DashMap<MarketKey,
//! Arc<RwLock<MarketStateEntry>>>`) and `SpecCache` (idempotent,
//! versioned upsert with material-change detection).

pub mod error;

pub use error::{WatchlistError, WatchlistResult};

use alloy::primitives::Address;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use sentinel_core::{Market, MarketKey, MarketStatus, MarketType, RejectReason, Usd};
use std::sync::Arc;
use tracing::{debug, info};

/// Active markets are reaped 24h after their last update; non-active
/// (pending/rejected) entries are reaped after 1h, per the documented
/// lifecycle summary.
const ACTIVE_IDLE: i64 = 24 * 3600;
const NON_ACTIVE_IDLE: i64 = 3600;

/// The per-market lifecycle registry.
#[derive(Default)]
pub struct Watchlist {
    markets: DashMap<MarketKey, Arc<RwLock<Market>>>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self {
            markets: DashMap::new(),
        }
    }

    /// Inserts a new pending candidate. Idempotent: if the key already
    /// exists (e.g. a reorg redelivered the same `PairCreated` log),
    /// this is a no-op and returns the existing entry rather than
    /// resetting its lifecycle state.
    pub fn insert_candidate(
        &self,
        key: MarketKey,
        token0: Address,
        token1: Address,
        fee: Option<u32>,
        now: DateTime<Utc>,
    ) -> Arc<RwLock<Market>> {
        if let Some(existing) = self.markets.get(&key) {
            debug!(%key, "duplicate candidate, watchlist insert is a no-op");
            return existing.clone();
        }
        let market = Market::new_pending(key, token0, token1, fee, now);
        let entry = Arc::new(RwLock::new(market));
        self.markets.insert(key, entry.clone());
        info!(%key, market_type = %key.market_type, "candidate registered");
        entry
    }

    pub fn get(&self, key: &MarketKey) -> Option<Arc<RwLock<Market>>> {
        self.markets.get(key).map(|e| e.clone())
    }

    /// `pending -> active`. Returns `false` if the market is unknown or
    /// already terminal.
    pub fn admit(&self, key: &MarketKey, liquidity_usd: Usd, now: DateTime<Utc>) -> bool {
        match self.markets.get(key) {
            Some(entry) => {
                let admitted = entry.write().admit(liquidity_usd, now);
                if admitted {
                    info!(%key, liquidity_usd = liquidity_usd.value(), "market admitted");
                }
                admitted
            }
            None => false,
        }
    }

    /// `pending -> rejected`. Returns `false` if the market is unknown
    /// or already terminal.
    pub fn reject(&self, key: &MarketKey, reason: RejectReason, now: DateTime<Utc>) -> bool {
        match self.markets.get(key) {
            Some(entry) => {
                let rejected = entry.write().reject(reason, now);
                if rejected {
                    info!(%key, %reason, "market rejected");
                }
                rejected
            }
            None => false,
        }
    }

    pub fn is_active(&self, key: &MarketKey) -> bool {
        self.markets
            .get(key)
            .map(|e| e.read().is_active())
            .unwrap_or(false)
    }

    pub fn active_keys(&self) -> Vec<MarketKey> {
        self.markets
            .iter()
            .filter(|e| e.read().is_active())
            .map(|e| *e.key())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Touches `last_updated` on an entry, used by subscriber callbacks
    /// so the idle reaper doesn't evict a quiet-but-alive market.
    pub fn touch(&self, key: &MarketKey, now: DateTime<Utc>) {
        if let Some(entry) = self.markets.get(key) {
            entry.write().last_updated = now;
        }
    }

    /// Reaps markets idle past their lifecycle-appropriate threshold,
    /// returning the keys removed.
    pub fn reap_idle(&self, now: DateTime<Utc>) -> Vec<MarketKey> {
        let mut reaped = Vec::new();
        self.markets.retain(|key, entry| {
            let market = entry.read();
            let threshold = if market.status == MarketStatus::Active {
                ACTIVE_IDLE
            } else {
                NON_ACTIVE_IDLE
            };
            let idle = market.idle_for(now);
            let keep = idle < Duration::seconds(threshold);
            if !keep {
                reaped.push(*key);
            }
            keep
        });
        if !reaped.is_empty() {
            debug!(count = reaped.len(), "reaped idle markets");
        }
        reaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::Chain;

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    fn key() -> MarketKey {
        MarketKey::new(Chain::Bsc, MarketType::V2, addr(0xAA))
    }

    #[test]
    fn test_insert_candidate_is_idempotent() {
        let wl = Watchlist::new();
        let now = Utc::now();
        wl.insert_candidate(key(), addr(1), addr(2), None, now);
        wl.insert_candidate(key(), addr(9), addr(9), None, now);
        assert_eq!(wl.len(), 1);
        let entry = wl.get(&key()).unwrap();
        // Second insert did not clobber the original token addresses.
        assert_eq!(entry.read().token0, addr(1));
    }

    #[test]
    fn test_admit_then_reject_is_noop() {
        let wl = Watchlist::new();
        let now = Utc::now();
        wl.insert_candidate(key(), addr(1), addr(2), None, now);
        assert!(wl.admit(&key(), Usd::new(10_000.0), now));
        assert!(!wl.reject(&key(), RejectReason::MinLiquidity, now));
        assert!(wl.is_active(&key()));
    }

    #[test]
    fn test_reap_idle_respects_active_vs_non_active_thresholds() {
        let wl = Watchlist::new();
        let t0 = Utc::now();
        wl.insert_candidate(key(), addr(1), addr(2), None, t0);

        // Pending market idle for 2h should be reaped (non-active threshold is 1h).
        let t1 = t0 + Duration::hours(2);
        let reaped = wl.reap_idle(t1);
        assert_eq!(reaped, vec![key()]);
        assert!(wl.get(&key()).is_none());
    }

    #[test]
    fn test_active_market_survives_past_non_active_threshold() {
        let wl = Watchlist::new();
        let t0 = Utc::now();
        wl.insert_candidate(key(), addr(1), addr(2), None, t0);
        wl.admit(&key(), Usd::new(5_000.0), t0);

        let t1 = t0 + Duration::hours(2);
        let reaped = wl.reap_idle(t1);
        assert!(reaped.is_empty());
        assert!(wl.get(&key()).is_some());
    }
}
