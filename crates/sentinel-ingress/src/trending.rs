//! Trending-pool poller (§4.1, source 2 of candidate discovery).
//!
//! One interval-ticker task per chain, shaped after the teacher's
//! market-discovery loop: fetch candidates (aggregator's trending
//! endpoint, falling back to `synthesize_trending` if it errors),
//! filter, dedup against recent admissions, and register/admit each
//! survivor.

use crate::admit::{admit_candidate, AdmitDeps};
use crate::dedup::TrendingDedup;
use alloy::primitives::Address;
use sentinel_aggregator::{AggregatorClient, AggregatorPair};
use sentinel_core::{BaseToken, BaseTokenTable, Chain, MarketKey, MarketType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct TrendingPollerConfig {
    pub poll_interval: Duration,
    pub min_liquidity_usd: f64,
    pub top_k: u32,
}

impl Default for TrendingPollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            min_liquidity_usd: 10_000.0,
            top_k: 50,
        }
    }
}

/// DEX families recognized by address shape / `dex_id`; anything else
/// is dropped by the allowlist filter.
const ALLOWED_DEX_PREFIXES: &[&str] = &["pancakeswap", "uniswap"];

pub fn spawn_trending_poller(
    deps: Arc<AdmitDeps>,
    aggregator: Arc<AggregatorClient>,
    base_tokens: Arc<BaseTokenTable>,
    dedup: Arc<TrendingDedup>,
    chain: Chain,
    config: TrendingPollerConfig,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.poll_interval);
        loop {
            ticker.tick().await;
            let candidates = fetch_candidates(&aggregator, &base_tokens, chain, config.top_k).await;
            let admitted = process_candidates(&deps, &dedup, &base_tokens, chain, candidates, config.min_liquidity_usd).await;
            debug!(%chain, admitted, "trending poll cycle complete");
        }
    });
}

async fn fetch_candidates(
    aggregator: &AggregatorClient,
    base_tokens: &BaseTokenTable,
    chain: Chain,
    top_k: u32,
) -> Vec<AggregatorPair> {
    match aggregator.fetch_trending(chain, top_k).await {
        Ok(pairs) if !pairs.is_empty() => pairs,
        Ok(_) => {
            debug!(%chain, "trending endpoint returned no pairs, synthesizing");
            synthesize(aggregator, base_tokens, chain).await
        }
        Err(e) => {
            warn!(%chain, error = %e, "trending endpoint failed, synthesizing");
            synthesize(aggregator, base_tokens, chain).await
        }
    }
}

async fn synthesize(aggregator: &AggregatorClient, base_tokens: &BaseTokenTable, chain: Chain) -> Vec<AggregatorPair> {
    let addresses: Vec<(BaseToken, Address)> = BaseToken::priority_order(chain)
        .iter()
        .filter_map(|b| base_tokens.address_of(chain, *b).map(|a| (*b, a)))
        .collect();
    aggregator.synthesize_trending(chain, &addresses).await
}

async fn process_candidates(
    deps: &Arc<AdmitDeps>,
    dedup: &Arc<TrendingDedup>,
    base_tokens: &BaseTokenTable,
    chain: Chain,
    candidates: Vec<AggregatorPair>,
    min_liquidity_usd: f64,
) -> usize {
    let mut admitted = 0usize;
    for pair in candidates {
        if !passes_filters(&pair, base_tokens, chain, min_liquidity_usd) {
            continue;
        }
        let market_type = if pair.dex_id.to_ascii_lowercase().contains("v3") {
            MarketType::V3
        } else {
            MarketType::V2
        };
        let key = MarketKey::new(chain, market_type, pair.pair_address);
        if !dedup.admit(key) {
            continue;
        }
        deps.watchlist
            .insert_candidate(key, pair.base_token, pair.quote_token, pair.fee_tier, chrono::Utc::now());
        admit_candidate(deps, key, "trending").await;
        admitted += 1;
    }
    admitted
}

fn passes_filters(pair: &AggregatorPair, base_tokens: &BaseTokenTable, chain: Chain, min_liquidity_usd: f64) -> bool {
    if !ALLOWED_DEX_PREFIXES.iter().any(|p| pair.dex_id.to_ascii_lowercase().starts_with(p)) {
        return false;
    }
    if pair.pair_address == Address::ZERO {
        return false;
    }
    if pair.liquidity_usd.unwrap_or(0.0) < min_liquidity_usd {
        return false;
    }
    base_tokens.is_base_token(chain, pair.base_token) || base_tokens.is_base_token(chain, pair.quote_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::BaseTokenEntry;

    fn base_tokens() -> BaseTokenTable {
        BaseTokenTable::new(vec![BaseTokenEntry {
            token: BaseToken::Wbnb,
            chain: Chain::Bsc,
            address: Address::from([2u8; 20]),
            decimals: 18,
        }])
    }

    fn sample_pair(dex_id: &str, liquidity: Option<f64>, base: Address, quote: Address) -> AggregatorPair {
        AggregatorPair {
            chain: Chain::Bsc,
            pair_address: Address::from([9u8; 20]),
            dex_id: dex_id.to_string(),
            base_token: base,
            quote_token: quote,
            price_usd: Some(1.0),
            liquidity_usd: liquidity,
            buys_m5: None,
            sells_m5: None,
            buys_h1: None,
            sells_h1: None,
            fee_tier: None,
        }
    }

    #[test]
    fn test_passes_filters_requires_allowlisted_dex() {
        let bt = base_tokens();
        let pair = sample_pair("sushiswap", Some(50_000.0), Address::from([2u8; 20]), Address::from([1u8; 20]));
        assert!(!passes_filters(&pair, &bt, Chain::Bsc, 10_000.0));
    }

    #[test]
    fn test_passes_filters_requires_liquidity_threshold() {
        let bt = base_tokens();
        let pair = sample_pair("pancakeswap-v2", Some(1_000.0), Address::from([2u8; 20]), Address::from([1u8; 20]));
        assert!(!passes_filters(&pair, &bt, Chain::Bsc, 10_000.0));
    }

    #[test]
    fn test_passes_filters_requires_a_base_token_side() {
        let bt = base_tokens();
        let pair = sample_pair("pancakeswap-v2", Some(50_000.0), Address::from([3u8; 20]), Address::from([4u8; 20]));
        assert!(!passes_filters(&pair, &bt, Chain::Bsc, 10_000.0));
    }

    #[test]
    fn test_passes_filters_accepts_valid_candidate() {
        let bt = base_tokens();
        let pair = sample_pair("pancakeswap-v3", Some(50_000.0), Address::from([2u8; 20]), Address::from([1u8; 20]));
        assert!(passes_filters(&pair, &bt, Chain::Bsc, 10_000.0));
    }
}
