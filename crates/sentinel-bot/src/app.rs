//! Main application orchestration.
//!
//! Builds every collaborator (chain clients, gate pipeline, pricing
//! caches, alert evaluator) and hands them to `Ingress::run`.

use crate::config::AppConfig;
use crate::error::AppResult;
use sentinel_aggregator::AggregatorClient;
use sentinel_alerts::{AlertEvaluator, LoggingNotifier};
use sentinel_chain::{connect_ws, AlloyChainClient, ChainClient};
use sentinel_core::{BaseTokenTable, Chain};
use sentinel_ingress::Ingress;
use sentinel_pricing::{DecimalsCache, PriceOracle};
use sentinel_safety::{ChainDexConfig, GatePipeline};
use sentinel_watchlist::Watchlist;
use sentinel_windows::{FdvTracker, TaxEstimator, WindowStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Owns the fully-assembled ingress pipeline. `run` never returns
/// under normal operation.
pub struct Application {
    ingress: Ingress,
}

impl Application {
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let mut chain_clients: HashMap<Chain, Arc<dyn ChainClient>> = HashMap::new();
        let mut dex_config: HashMap<Chain, ChainDexConfig> = HashMap::new();

        for (chain, dex_family) in config.dex_families() {
            let ws_url = match chain {
                Chain::Bsc => &config.bsc_wss,
                Chain::Eth => &config.eth_wss,
            };
            let provider = connect_ws(ws_url).await?;
            let client: Arc<dyn ChainClient> =
                Arc::new(AlloyChainClient::new(chain, provider, vec![dex_family.clone()]));
            chain_clients.insert(chain, client);

            if let (Some(v3_factory), Some(v3_quoter)) = (dex_family.v3_factory, dex_family.v3_quoter) {
                dex_config.insert(chain, ChainDexConfig { v3_factory, v3_quoter });
            }
        }

        let base_tokens = Arc::new(BaseTokenTable::new(config.base_token_entries()));
        let aggregator = Arc::new(AggregatorClient::new(config.aggregator_base_url.clone())?);
        let watchlist = Arc::new(Watchlist::new());
        let windows = Arc::new(WindowStore::new());
        let tax = Arc::new(TaxEstimator::new());
        let fdv = Arc::new(FdvTracker::new());
        let decimals = Arc::new(DecimalsCache::new());

        let pricing_aggregator = AggregatorClient::new(config.aggregator_base_url.clone())?;
        let pricing = Arc::new(PriceOracle::new(pricing_aggregator));

        let gate = Arc::new(GatePipeline::new(
            chain_clients.clone(),
            dex_config,
            (*base_tokens).clone(),
            aggregator.clone(),
            pricing.clone(),
            watchlist.clone(),
            tax.clone(),
            config.gate,
        ));

        let notifier = Arc::new(LoggingNotifier);
        let alerts = Arc::new(AlertEvaluator::new(
            windows.clone(),
            fdv,
            config.alerts,
            notifier,
        ));

        let ingress = Ingress::new(
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
            config.max_active_markets,
            config.trending,
        );

        Ok(Self { ingress })
    }

    /// Runs the ingress pipeline. Never returns under normal operation.
    pub async fn run(self) {
        info!("starting ingress");
        self.ingress.run().await;
    }
}
