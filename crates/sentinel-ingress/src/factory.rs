//! Factory-event watcher (§4.1, source 1 of candidate discovery).
//!
//! One task per chain: drains `ChainClient::subscribe_factory_events`
//! and hands every `PairCreated`/`PoolCreated` log to the admit-or-hold
//! pipeline shared with the trending poller.

use crate::admit::{admit_candidate, AdmitDeps};
use sentinel_chain::{ChainClient, FactoryCandidate};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub fn spawn_factory_watcher(deps: Arc<AdmitDeps>, client: Arc<dyn ChainClient>) {
    let (tx, mut rx) = mpsc::channel::<FactoryCandidate>(256);

    let watcher_client = client.clone();
    tokio::spawn(async move {
        if let Err(e) = watcher_client.subscribe_factory_events(tx).await {
            warn!(chain = %watcher_client.chain(), error = %e, "factory event subscription ended");
        }
    });

    tokio::spawn(async move {
        info!(chain = %client.chain(), "factory watcher started");
        while let Some(candidate) = rx.recv().await {
            let event = candidate.event;
            let key = sentinel_core::MarketKey::new(candidate.chain, event.market_type, event.pool);
            deps.watchlist
                .insert_candidate(key, event.token0, event.token1, event.fee, chrono::Utc::now());
            admit_candidate(&deps, key, "factory").await;
        }
    });
}
