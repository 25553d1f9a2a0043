//! Per-market event subscription and translation (C8, §4.3).
//!
//! One task per admitted market: reads `MarketEvent`s off the channel
//! `ChainClient::subscribe_market_events` was given, converts each
//! into a `TradeEvent`, records it, forwards tax samples and alert
//! requests, and updates `lastMintUsd` on `Mint`.

use crate::pricer::{relative_price, target_usd_price, PricingContext};
use crate::slots::StopHandle;
use crate::translate::{normalize_v2_swap, normalize_v3_swap, target_is_token0, NormalizedSwap};
use chrono::Utc;
use sentinel_aggregator::AggregatorClient;
use sentinel_alerts::{AlertEvaluator, AlertInput};
use sentinel_chain::{ChainClient, MarketEvent, V2MintEvent};
use sentinel_core::{BaseTokenTable, MarketKey, MarketType, TradeEvent, Usd};
use sentinel_pricing::{DecimalsCache, PriceOracle};
use sentinel_watchlist::Watchlist;
use sentinel_windows::{TaxEstimator, TaxSide, WindowStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Collaborators a subscriber task needs; grouped so `spawn_for_market`
/// doesn't take a dozen positional arguments. One instance is shared
/// across every market on every chain, so the chain client is resolved
/// per-event rather than fixed to one chain.
pub struct SubscriberDeps {
    pub chain_clients: HashMap<sentinel_core::Chain, Arc<dyn ChainClient>>,
    pub aggregator: Arc<AggregatorClient>,
    pub pricing: Arc<PriceOracle>,
    pub decimals: Arc<DecimalsCache>,
    pub base_tokens: Arc<BaseTokenTable>,
    pub watchlist: Arc<Watchlist>,
    pub windows: Arc<WindowStore>,
    pub tax: Arc<TaxEstimator>,
    pub alerts: Arc<AlertEvaluator>,
}

/// Starts a market's subscription and its handler loop; returns the
/// stop handle the slot reaper uses to tear it down.
pub async fn spawn_for_market(deps: Arc<SubscriberDeps>, key: MarketKey) -> StopHandle {
    let (event_tx, mut event_rx) = mpsc::channel::<MarketEvent>(256);
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

    let Some(client) = deps.chain_clients.get(&key.chain).cloned() else {
        warn!(%key, "no chain client configured for this chain, refusing subscription");
        return StopHandle::new(mpsc::channel(1).0);
    };
    let address = key.address;
    tokio::spawn(async move {
        if let Err(e) = client.subscribe_market_events(address, event_tx).await {
            warn!(%key, error = %e, "market event subscription ended");
        }
    });

    tokio::spawn(async move {
        info!(%key, "market subscriber started");
        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    info!(%key, "market subscriber stopped");
                    break;
                }
                event = event_rx.recv() => {
                    match event {
                        Some(event) => handle_event(&deps, key, event).await,
                        None => {
                            debug!(%key, "market event channel closed");
                            break;
                        }
                    }
                }
            }
        }
    });

    StopHandle::new(stop_tx)
}

async fn handle_event(deps: &Arc<SubscriberDeps>, key: MarketKey, event: MarketEvent) {
    let Some(market_arc) = deps.watchlist.get(&key) else {
        return;
    };
    let Some(client) = deps.chain_clients.get(&key.chain) else {
        return;
    };
    let client = client.as_ref();
    let (token0, token1) = {
        let market = market_arc.read();
        (market.token0, market.token1)
    };

    let target_token0 = target_is_token0(&deps.base_tokens, key.chain, token0, token1);
    let decimals0 = deps.decimals.get_or_fetch(client, token0).await;
    let decimals1 = deps.decimals.get_or_fetch(client, token1).await;
    let (decimals_target, decimals_base) = if target_token0 {
        (decimals0, decimals1)
    } else {
        (decimals1, decimals0)
    };

    let market_type = match &event {
        MarketEvent::V2Swap(_) | MarketEvent::V2Mint(_) => MarketType::V2,
        MarketEvent::V3Swap(_) => MarketType::V3,
    };
    let ctx = PricingContext {
        chain: key.chain,
        market_type,
        address: key.address,
        token0,
        token1,
        target_is_token0: target_token0,
        decimals0,
        decimals1,
    };

    match event {
        MarketEvent::V2Swap(swap) => {
            let Some(normalized) = normalize_v2_swap(&swap, target_token0, decimals_target, decimals_base) else {
                return;
            };
            record_trade(deps, client, key, &ctx, normalized).await;
        }
        MarketEvent::V3Swap(swap) => {
            let Some(normalized) = normalize_v3_swap(&swap, target_token0, decimals_target, decimals_base) else {
                return;
            };
            record_trade(deps, client, key, &ctx, normalized).await;
        }
        MarketEvent::V2Mint(mint) => {
            handle_mint(deps, client, key, &ctx, decimals_target, mint).await;
        }
    }
}

/// Steps 4-7 of the per-swap pipeline: price, window record, tax
/// sample (when the non-target side is a recognized base token), and
/// dispatch to the alert evaluator.
async fn record_trade(deps: &Arc<SubscriberDeps>, client: &dyn ChainClient, key: MarketKey, ctx: &PricingContext, swap: NormalizedSwap) {
    let Some(price) = target_usd_price(ctx, client, &deps.pricing, &deps.aggregator, &deps.base_tokens).await else {
        debug!(%key, "no price available, dropping trade event");
        return;
    };

    let usd_value = Usd::new(swap.delta_target.abs() * price);
    deps.windows.record(key, TradeEvent::new(Utc::now(), usd_value, swap.is_buy, Some(swap.buyer)));
    deps.watchlist.touch(&key, Utc::now());

    let non_target_side = if ctx.target_is_token0 { ctx.token1 } else { ctx.token0 };
    if deps.base_tokens.is_base_token(ctx.chain, non_target_side) {
        if let Some(relative) = relative_price(ctx, client).await {
            let expected_target = swap.delta_base / relative;
            let side = if swap.is_buy { TaxSide::Buy } else { TaxSide::Sell };
            deps.tax.record(key, side, expected_target, swap.delta_target.abs());
        }
    }

    let metadata = deps.watchlist.get(&key).map(|m| m.read().metadata);
    let liquidity_usd = metadata.and_then(|m| m.liquidity_usd).map(|u| u.value());
    let last_mint_usd = metadata.and_then(|m| m.last_mint_usd).map(|u| u.value());

    let total_supply_target = client
        .get_total_supply(if ctx.target_is_token0 { ctx.token0 } else { ctx.token1 })
        .await
        .ok();
    let decimals_target = if ctx.target_is_token0 { ctx.decimals0 } else { ctx.decimals1 };
    let fdv_usd = total_supply_target.and_then(|supply| {
        sentinel_core::normalize_amount(&supply.to_string(), decimals_target).map(|n| n * price)
    });

    let input = AlertInput {
        key,
        market_type: ctx.market_type,
        address: ctx.address,
        token0: ctx.token0,
        token1: ctx.token1,
        target_is_token0: ctx.target_is_token0,
        last_trade_usd: usd_value.value(),
        is_buy: swap.is_buy,
        last_mint_usd,
        liquidity_usd,
        fdv_usd,
    };
    deps.alerts.evaluate(input, Utc::now());
}

async fn handle_mint(deps: &Arc<SubscriberDeps>, client: &dyn ChainClient, key: MarketKey, ctx: &PricingContext, decimals_target: u8, mint: V2MintEvent) {
    let Some(price) = target_usd_price(ctx, client, &deps.pricing, &deps.aggregator, &deps.base_tokens).await else {
        return;
    };

    let amount_target = if ctx.target_is_token0 { mint.amount0 } else { mint.amount1 };
    let Some(normalized) = sentinel_core::normalize_amount(&amount_target.to_string(), decimals_target) else {
        return;
    };

    // A mint adds both sides of the pool at parity value, so the
    // target-side leg alone is half the total liquidity added.
    let mint_usd = Usd::new(2.0 * normalized * price);

    if let Some(market_arc) = deps.watchlist.get(&key) {
        market_arc.write().metadata.last_mint_usd = Some(mint_usd);
        info!(%key, mint_usd = mint_usd.value(), "recorded mint liquidity estimate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use async_trait::async_trait;
    use sentinel_chain::{ChainError, ChainResult, Reserves, Slot0, SwapQuote};
    use sentinel_core::{BaseTokenEntry, Chain, MarketType};
    use sentinel_windows::FdvTracker;

    fn addr(b: u8) -> alloy::primitives::Address {
        alloy::primitives::Address::from([b; 20])
    }

    struct StubClient;

    #[async_trait]
    impl ChainClient for StubClient {
        fn chain(&self) -> Chain {
            Chain::Bsc
        }
        async fn get_code(&self, _address: alloy::primitives::Address) -> ChainResult<Vec<u8>> {
            Ok(vec![1])
        }
        async fn get_reserves(&self, _pair: alloy::primitives::Address) -> ChainResult<Reserves> {
            Ok(Reserves {
                reserve0: U256::from(1_000_000_000_000_000_000u64),
                reserve1: U256::from(2_000_000_000_000_000_000u64),
            })
        }
        async fn get_slot0(&self, _pool: alloy::primitives::Address) -> ChainResult<Slot0> {
            Err(ChainError::RpcFailed("unused".into()))
        }
        async fn get_amounts_out(&self, _amount_in: U256, _path: &[alloy::primitives::Address]) -> ChainResult<SwapQuote> {
            Err(ChainError::RpcFailed("unused".into()))
        }
        async fn get_v3_pool(&self, _factory: alloy::primitives::Address, _t0: alloy::primitives::Address, _t1: alloy::primitives::Address, _fee: u32) -> ChainResult<alloy::primitives::Address> {
            Err(ChainError::RpcFailed("unused".into()))
        }
        async fn quote_exact_input_single(&self, _quoter: alloy::primitives::Address, _tin: alloy::primitives::Address, _tout: alloy::primitives::Address, _fee: u32, _amount_in: U256) -> ChainResult<SwapQuote> {
            Err(ChainError::RpcFailed("unused".into()))
        }
        async fn get_decimals(&self, _token: alloy::primitives::Address) -> ChainResult<u8> {
            Ok(18)
        }
        async fn get_total_supply(&self, _token: alloy::primitives::Address) -> ChainResult<U256> {
            Ok(U256::from(1_000_000_000_000_000_000_000u128))
        }
        async fn subscribe_factory_events(&self, _tx: mpsc::Sender<sentinel_chain::FactoryCandidate>) -> ChainResult<()> {
            Ok(())
        }
        async fn subscribe_market_events(&self, _market: alloy::primitives::Address, _tx: mpsc::Sender<MarketEvent>) -> ChainResult<()> {
            Ok(())
        }
    }

    fn deps() -> (Arc<SubscriberDeps>, MarketKey) {
        let key = MarketKey::new(Chain::Bsc, MarketType::V2, addr(9));
        let base_tokens = Arc::new(BaseTokenTable::new(vec![BaseTokenEntry {
            token: sentinel_core::BaseToken::Wbnb,
            chain: Chain::Bsc,
            address: addr(2),
            decimals: 18,
        }]));
        let watchlist = Arc::new(Watchlist::new());
        watchlist.insert_candidate(key, addr(1), addr(2), None, Utc::now());
        watchlist.admit(&key, Usd::new(20_000.0), Utc::now());

        let aggregator = Arc::new(AggregatorClient::new("https://example.invalid").unwrap());
        let pricing = Arc::new(PriceOracle::new(AggregatorClient::new("https://example.invalid").unwrap()));
        let windows = Arc::new(WindowStore::new());
        let fdv = Arc::new(FdvTracker::new());
        let tax = Arc::new(TaxEstimator::new());
        let alerts = Arc::new(AlertEvaluator::new(
            windows.clone(),
            fdv,
            sentinel_alerts::AlertConfig::default(),
            Arc::new(sentinel_alerts::LoggingNotifier::default()),
        ));

        let mut chain_clients: HashMapChainClients = HashMapChainClients::new();
        chain_clients.insert(Chain::Bsc, Arc::new(StubClient) as Arc<dyn ChainClient>);

        let deps = Arc::new(SubscriberDeps {
            chain_clients,
            aggregator,
            pricing,
            decimals: Arc::new(DecimalsCache::new()),
            base_tokens,
            watchlist,
            windows,
            tax,
            alerts,
        });
        (deps, key)
    }

    type HashMapChainClients = std::collections::HashMap<Chain, Arc<dyn ChainClient>>;

    #[tokio::test]
    async fn test_v2_swap_records_a_window_event() {
        let (deps, key) = deps();
        let event = MarketEvent::V2Swap(sentinel_chain::V2SwapEvent {
            pool: key.address,
            sender: addr(5),
            to: addr(6),
            amount0_in: U256::ZERO,
            amount1_in: U256::from(1_000_000_000_000_000_000u64),
            amount0_out: U256::from(500_000_000_000_000_000u64),
            amount1_out: U256::ZERO,
        });
        handle_event(&deps, key, event).await;
        let stats = deps.windows.one_minute(&key, Utc::now()).unwrap();
        assert_eq!(stats.buy_txs, 1);
    }

    #[tokio::test]
    async fn test_v2_mint_records_last_mint_usd() {
        let (deps, key) = deps();
        let event = MarketEvent::V2Mint(sentinel_chain::V2MintEvent {
            pool: key.address,
            sender: addr(5),
            amount0: U256::from(1_000_000_000_000_000_000u64),
            amount1: U256::from(2_000_000_000_000_000_000u64),
        });
        handle_event(&deps, key, event).await;
        let market = deps.watchlist.get(&key).unwrap();
        assert!(market.read().metadata.last_mint_usd.is_some());
    }
}
