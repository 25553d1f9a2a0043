//! Shared "gate then maybe subscribe" path (§4.1, §4.2 -> §4.3 handoff).
//!
//! Both the factory watcher and the trending poller funnel newly
//! registered candidates through here: the gate pipeline decides
//! admit/reject, and admitted markets attempt to claim a subscription
//! slot. A market that is admitted but can't claim a slot stays
//! `active`-but-unsubscribed on the watchlist until the idle reaper
//! frees capacity (§9's resolved Open Question).

use crate::slots::{SlotBudget, StopHandle};
use crate::subscriber::{spawn_for_market, SubscriberDeps};
use dashmap::DashMap;
use sentinel_core::MarketKey;
use sentinel_safety::GatePipeline;
use sentinel_watchlist::Watchlist;
use std::sync::Arc;
use tracing::{info, warn};

/// Collaborators needed to take a candidate from "registered" to
/// "subscribed", shared by both discovery paths.
pub struct AdmitDeps {
    pub watchlist: Arc<Watchlist>,
    pub gate: Arc<GatePipeline>,
    pub slots: Arc<SlotBudget>,
    pub subscriber: Arc<SubscriberDeps>,
    pub active: DashMap<MarketKey, StopHandle>,
}

pub async fn admit_candidate(deps: &Arc<AdmitDeps>, key: MarketKey, source: &'static str) {
    let Some(market_arc) = deps.watchlist.get(&key) else {
        return;
    };
    if deps.watchlist.is_active(&key) || market_arc.read().status.is_terminal() {
        return;
    }

    let market = market_arc.read().clone();
    let now = chrono::Utc::now();
    if deps.gate.evaluate(&market, now).await.is_err() {
        return;
    }

    if !deps.slots.try_acquire(key) {
        warn!(%key, source, "market admitted but no subscription slot available");
        return;
    }

    let handle = spawn_for_market(deps.subscriber.clone(), key).await;
    deps.active.insert(key, handle);
    info!(%key, source, "market subscribed");
}

/// Releases a market's slot and stops its subscriber, used by the idle
/// reaper when a watchlist entry is evicted.
pub fn release(deps: &Arc<AdmitDeps>, key: &MarketKey) {
    if let Some((_, handle)) = deps.active.remove(key) {
        handle.stop();
        deps.slots.release(key);
    }
}
