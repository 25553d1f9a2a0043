//! Resolves a USD price for a market's target token, preferring the
//! AMM-derived relative price and falling back to the aggregator's
//! reported spot price (§4.3 step 4, §4.5 "USD derivation").

use alloy::primitives::Address;
use sentinel_aggregator::AggregatorClient;
use sentinel_chain::ChainClient;
use sentinel_core::{BaseToken, BaseTokenTable, Chain, MarketType};
use sentinel_pricing::{
    v2_price_token0_in_token1, v2_price_token1_in_token0, v3_price_token0_per_token1,
    v3_price_token1_per_token0, PriceOracle,
};
use tracing::debug;

/// Everything needed to price one market's target side.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext {
    pub chain: Chain,
    pub market_type: MarketType,
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub target_is_token0: bool,
    pub decimals0: u8,
    pub decimals1: u8,
}

/// USD price of one unit of the target token, or `None` if neither the
/// AMM-derived nor the aggregator fallback could produce one (the
/// event should then be dropped per §4.3 step 4).
pub async fn target_usd_price(
    ctx: &PricingContext,
    client: &dyn ChainClient,
    pricing: &PriceOracle,
    aggregator: &AggregatorClient,
    base_tokens: &BaseTokenTable,
) -> Option<f64> {
    if let Some(price) = amm_derived_usd(ctx, client, pricing, base_tokens).await {
        return Some(price);
    }

    debug!(address = %ctx.address, "falling back to aggregator spot price");
    aggregator
        .fetch_pair(ctx.chain, ctx.address)
        .await
        .ok()
        .flatten()
        .and_then(|p| p.price_usd)
}

async fn amm_derived_usd(
    ctx: &PricingContext,
    client: &dyn ChainClient,
    pricing: &PriceOracle,
    base_tokens: &BaseTokenTable,
) -> Option<f64> {
    let base_token_address = if ctx.target_is_token0 { ctx.token1 } else { ctx.token0 };
    let base = base_tokens.resolve(ctx.chain, base_token_address)?.token;
    let base_usd = pricing.get_base_token_usd(ctx.chain, base_token_address, base).await?;
    let relative = relative_price(ctx, client).await?;
    Some(relative * base_usd)
}

/// Units of the non-target (base) side per one unit of the target
/// token, read live from the pool's current reserves/`slot0`. Used
/// both for USD derivation and as the "expected" leg of a tax sample.
pub async fn relative_price(ctx: &PricingContext, client: &dyn ChainClient) -> Option<f64> {
    if ctx.market_type.is_v2() {
        let reserves = client.get_reserves(ctx.address).await.ok()?;
        if ctx.target_is_token0 {
            v2_price_token0_in_token1(reserves.reserve0, reserves.reserve1, ctx.decimals0, ctx.decimals1)
        } else {
            v2_price_token1_in_token0(reserves.reserve0, reserves.reserve1, ctx.decimals0, ctx.decimals1)
        }
    } else {
        let slot0 = client.get_slot0(ctx.address).await.ok()?;
        if ctx.target_is_token0 {
            v3_price_token0_per_token1(slot0.sqrt_price_x96, ctx.decimals0, ctx.decimals1)
        } else {
            v3_price_token1_per_token0(slot0.sqrt_price_x96, ctx.decimals0, ctx.decimals1)
        }
    }
}

/// Whether a base token outranks another for USD-derivation purposes;
/// exposed so callers choosing among two base sides can match §4.5's
/// documented tie-break without duplicating `BaseToken::priority_order`.
pub fn prefer(chain: Chain, a: BaseToken, b: BaseToken) -> BaseToken {
    sentinel_pricing::preferred_base(chain, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefer_matches_priority_order() {
        assert_eq!(prefer(Chain::Bsc, BaseToken::Usdt, BaseToken::Wbnb), BaseToken::Wbnb);
    }
}
