//! Sequential, short-circuiting gate pipeline (§4.2, C10).
//!
//! Runs bytecode presence, minimum liquidity, sellability, LP-risk
//! scoring, and tax-sample-average checks in that fixed order against
//! a freshly discovered candidate, admitting or rejecting it on the
//! watchlist.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use sentinel_aggregator::AggregatorClient;
use sentinel_chain::ChainClient;
use sentinel_core::{BaseTokenTable, Chain, Market, MarketType, RejectReason, Usd};
use sentinel_pricing::PriceOracle;
use sentinel_watchlist::Watchlist;
use sentinel_windows::{TaxEstimator, TaxSide};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::probes::{check_bytecode, check_sellability_v2, check_sellability_v3, estimate_v2_liquidity_usd, lp_risk_score};

/// Thresholds the pipeline enforces. See §6 for environment mapping.
#[derive(Debug, Clone, Copy)]
pub struct GatePipelineConfig {
    pub min_liq_usd: f64,
    pub max_tax_pct: f64,
}

impl Default for GatePipelineConfig {
    fn default() -> Self {
        Self {
            min_liq_usd: 5000.0,
            max_tax_pct: 0.20,
        }
    }
}

/// Per-chain V3 factory/quoter addresses used by the sellability probe.
#[derive(Debug, Clone, Copy)]
pub struct ChainDexConfig {
    pub v3_factory: Address,
    pub v3_quoter: Address,
}

pub struct GatePipeline {
    chain_clients: HashMap<Chain, Arc<dyn ChainClient>>,
    dex_config: HashMap<Chain, ChainDexConfig>,
    base_tokens: BaseTokenTable,
    aggregator: Arc<AggregatorClient>,
    pricing: Arc<PriceOracle>,
    watchlist: Arc<Watchlist>,
    tax: Arc<TaxEstimator>,
    config: GatePipelineConfig,
}

impl GatePipeline {
    pub fn new(
        chain_clients: HashMap<Chain, Arc<dyn ChainClient>>,
        dex_config: HashMap<Chain, ChainDexConfig>,
        base_tokens: BaseTokenTable,
        aggregator: Arc<AggregatorClient>,
        pricing: Arc<PriceOracle>,
        watchlist: Arc<Watchlist>,
        tax: Arc<TaxEstimator>,
        config: GatePipelineConfig,
    ) -> Self {
        Self {
            chain_clients,
            dex_config,
            base_tokens,
            aggregator,
            pricing,
            watchlist,
            tax,
            config,
        }
    }

    /// Runs every gate in order against `market`, admitting or
    /// rejecting it on the watchlist. Returns the reason on rejection;
    /// `Ok(())` means the market is now `active`.
    pub async fn evaluate(&self, market: &Market, now: DateTime<Utc>) -> Result<(), RejectReason> {
        let key = market.key;
        let client = match self.chain_clients.get(&key.chain) {
            Some(c) => c.as_ref(),
            None => {
                warn!(%key, "no chain client configured, rejecting");
                self.watchlist.reject(&key, RejectReason::Unsellable, now);
                return Err(RejectReason::Unsellable);
            }
        };

        if let Err(reason) = check_bytecode(client, key.address, market.token0, market.token1).await {
            self.watchlist.reject(&key, reason, now);
            return Err(reason);
        }

        let token0_base = self.base_tokens.resolve(key.chain, market.token0).map(|e| e.token);
        let token1_base = self.base_tokens.resolve(key.chain, market.token1).map(|e| e.token);
        let has_base_token = token0_base.is_some() || token1_base.is_some();

        let liquidity_usd = self.estimate_liquidity(key.chain, key.market_type, market, token0_base, token1_base).await;

        match liquidity_usd {
            Some(usd) if usd.value() >= self.config.min_liq_usd => {}
            _ => {
                self.watchlist.reject(&key, RejectReason::MinLiquidity, now);
                return Err(RejectReason::MinLiquidity);
            }
        }

        let sellable = self.check_sellability(key.chain, key.market_type, market).await;
        if let Err(reason) = sellable {
            self.watchlist.reject(&key, reason, now);
            return Err(reason);
        }

        let score = lp_risk_score(has_base_token, liquidity_usd.map(|u| u.value()));
        if score >= 2 {
            self.watchlist.reject(&key, RejectReason::LpRisk, now);
            return Err(RejectReason::LpRisk);
        }

        if let Some(buy_avg) = self.tax.get_avg(&key, TaxSide::Buy) {
            if buy_avg > self.config.max_tax_pct {
                self.watchlist.reject(&key, RejectReason::TaxTooHigh, now);
                return Err(RejectReason::TaxTooHigh);
            }
        }
        if let Some(sell_avg) = self.tax.get_avg(&key, TaxSide::Sell) {
            if sell_avg > self.config.max_tax_pct {
                self.watchlist.reject(&key, RejectReason::TaxTooHigh, now);
                return Err(RejectReason::TaxTooHigh);
            }
        }

        let admitted = liquidity_usd.unwrap_or(Usd::ZERO);
        self.watchlist.admit(&key, admitted, now);
        info!(%key, liquidity_usd = admitted.value(), "candidate admitted");
        Ok(())
    }

    async fn estimate_liquidity(
        &self,
        chain: Chain,
        market_type: MarketType,
        market: &Market,
        token0_base: Option<sentinel_core::BaseToken>,
        token1_base: Option<sentinel_core::BaseToken>,
    ) -> Option<Usd> {
        if market_type.is_v3() {
            return self
                .aggregator
                .fetch_pair(chain, market.key.address)
                .await
                .ok()
                .flatten()
                .and_then(|p| p.liquidity_usd)
                .map(Usd::new);
        }

        let client = self.chain_clients.get(&chain)?.as_ref();
        let reserves = client.get_reserves(market.key.address).await.ok()?;
        let decimals0 = client.get_decimals(market.token0).await.unwrap_or(18);
        let decimals1 = client.get_decimals(market.token1).await.unwrap_or(18);

        let mut base_usd_table: HashMap<sentinel_core::BaseToken, f64> = HashMap::new();
        for base in [token0_base, token1_base].into_iter().flatten() {
            if let Some(address) = self.base_tokens.address_of(chain, base) {
                if let Some(usd) = self.pricing.get_base_token_usd(chain, address, base).await {
                    base_usd_table.insert(base, usd);
                }
            }
        }

        let from_reserves = estimate_v2_liquidity_usd(
            chain,
            &self.base_tokens,
            market.token0,
            market.token1,
            reserves.reserve0,
            reserves.reserve1,
            decimals0,
            decimals1,
            |b| base_usd_table.get(&b).copied(),
        );
        if from_reserves.is_some() {
            return from_reserves;
        }

        self.aggregator
            .fetch_pair(chain, market.key.address)
            .await
            .ok()
            .flatten()
            .and_then(|p| p.liquidity_usd)
            .map(Usd::new)
    }

    async fn check_sellability(&self, chain: Chain, market_type: MarketType, market: &Market) -> Result<(), RejectReason> {
        let client = self.chain_clients.get(&chain).ok_or(RejectReason::Unsellable)?.as_ref();
        let priority = sentinel_core::BaseToken::priority_order(chain);
        let base_addresses: Vec<Address> = priority
            .iter()
            .filter_map(|&b| self.base_tokens.address_of(chain, b))
            .collect();

        if market_type.is_v2() {
            let decimals = client.get_decimals(market.token0).await.unwrap_or(18);
            return check_sellability_v2(client, market.token0, decimals, &base_addresses).await;
        }

        let dex = self.dex_config.get(&chain).ok_or(RejectReason::Unsellable)?;
        let base_in_pool = if self.base_tokens.is_base_token(chain, market.token1) {
            market.token1
        } else if self.base_tokens.is_base_token(chain, market.token0) {
            market.token0
        } else {
            return Err(RejectReason::Unsellable);
        };
        let target = if base_in_pool == market.token0 { market.token1 } else { market.token0 };
        let decimals = client.get_decimals(target).await.unwrap_or(18);
        let fee = market.fee.unwrap_or(3000);

        check_sellability_v3(
            client,
            dex.v3_factory,
            dex.v3_quoter,
            market.key.address,
            market.token0,
            market.token1,
            fee,
            target,
            base_in_pool,
            decimals,
        )
        .await
    }
}
