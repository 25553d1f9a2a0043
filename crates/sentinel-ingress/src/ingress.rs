//! Top-level composition root for market discovery and subscription.
//!
//! Wires every ingress collaborator together and owns the three
//! long-running task families: per-chain factory watchers, per-chain
//! trending pollers, and the idle-sweep reaper.

use crate::admit::{release, AdmitDeps};
use crate::dedup::TrendingDedup;
use crate::factory::spawn_factory_watcher;
use crate::slots::SlotBudget;
use crate::subscriber::SubscriberDeps;
use crate::trending::{spawn_trending_poller, TrendingPollerConfig};
use sentinel_aggregator::AggregatorClient;
use sentinel_alerts::AlertEvaluator;
use sentinel_chain::ChainClient;
use sentinel_core::{BaseTokenTable, Chain};
use sentinel_pricing::{DecimalsCache, PriceOracle};
use sentinel_safety::GatePipeline;
use sentinel_watchlist::Watchlist;
use sentinel_windows::{TaxEstimator, WindowStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const REAP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Everything `Ingress::run` needs; assembled once at startup by the
/// binary composition root.
pub struct Ingress {
    chain_clients: HashMap<Chain, Arc<dyn ChainClient>>,
    aggregator: Arc<AggregatorClient>,
    base_tokens: Arc<BaseTokenTable>,
    watchlist: Arc<Watchlist>,
    gate: Arc<GatePipeline>,
    windows: Arc<WindowStore>,
    tax: Arc<TaxEstimator>,
    pricing: Arc<PriceOracle>,
    decimals: Arc<DecimalsCache>,
    alerts: Arc<AlertEvaluator>,
    slots: Arc<SlotBudget>,
    dedup: Arc<TrendingDedup>,
    trending_config: TrendingPollerConfig,
}

impl Ingress {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain_clients: HashMap<Chain, Arc<dyn ChainClient>>,
        aggregator: Arc<AggregatorClient>,
        base_tokens: Arc<BaseTokenTable>,
        watchlist: Arc<Watchlist>,
        gate: Arc<GatePipeline>,
        windows: Arc<WindowStore>,
        tax: Arc<TaxEstimator>,
        pricing: Arc<PriceOracle>,
        decimals: Arc<DecimalsCache>,
        alerts: Arc<AlertEvaluator>,
        max_active_markets: usize,
        trending_config: TrendingPollerConfig,
    ) -> Self {
        Self {
            chain_clients,
            aggregator,
            base_tokens,
            watchlist,
            gate,
            windows,
            tax,
            pricing,
            decimals,
            alerts,
            slots: Arc::new(SlotBudget::new(max_active_markets)),
            dedup: Arc::new(TrendingDedup::new()),
            trending_config,
        }
    }

    /// Spawns factory watchers and trending pollers for every
    /// configured chain, plus the idle-sweep reaper. Never returns.
    pub async fn run(self) {
        let admit_deps = Arc::new(AdmitDeps {
            watchlist: self.watchlist.clone(),
            gate: self.gate.clone(),
            slots: self.slots.clone(),
            subscriber: self.subscriber_deps(),
            active: dashmap::DashMap::new(),
        });

        for (chain, client) in &self.chain_clients {
            spawn_factory_watcher(admit_deps.clone(), client.clone());
            spawn_trending_poller(
                admit_deps.clone(),
                self.aggregator.clone(),
                self.base_tokens.clone(),
                self.dedup.clone(),
                *chain,
                self.trending_config,
            );
        }

        info!(chains = self.chain_clients.len(), "ingress started");
        self.reap_loop(admit_deps).await;
    }

    fn subscriber_deps(&self) -> Arc<SubscriberDeps> {
        Arc::new(SubscriberDeps {
            chain_clients: self.chain_clients.clone(),
            aggregator: self.aggregator.clone(),
            pricing: self.pricing.clone(),
            decimals: self.decimals.clone(),
            base_tokens: self.base_tokens.clone(),
            watchlist: self.watchlist.clone(),
            windows: self.windows.clone(),
            tax: self.tax.clone(),
            alerts: self.alerts.clone(),
        })
    }

    async fn reap_loop(&self, admit_deps: Arc<AdmitDeps>) {
        let mut ticker = tokio::time::interval(REAP_INTERVAL);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now();
            let reaped = self.watchlist.reap_idle(now);
            for key in &reaped {
                release(&admit_deps, key);
            }
            self.windows.reap_idle(now);
            self.dedup.sweep();
            if !reaped.is_empty() {
                info!(count = reaped.len(), slots_in_use = self.slots.in_use(), "idle sweep reaped markets");
            }
        }
    }
}
