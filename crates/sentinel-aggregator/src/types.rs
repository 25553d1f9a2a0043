//! Untyped-JSON-friendly shapes read out of the market aggregator.
//!
//! The aggregator's actual response schema is far larger than this;
//! per the documented contract only a handful of fields are ever read,
//! so we parse into `serde_json::Value` and extract fields defensively
//! rather than modeling the whole response.

use alloy::primitives::Address;
use sentinel_core::Chain;
use serde::{Deserialize, Serialize};

/// A single pair/pool as reported by the aggregator, with only the
/// fields this sentinel consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorPair {
    pub chain: Chain,
    pub pair_address: Address,
    pub dex_id: String,
    pub base_token: Address,
    pub quote_token: Address,
    pub price_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub buys_m5: Option<u32>,
    pub sells_m5: Option<u32>,
    pub buys_h1: Option<u32>,
    pub sells_h1: Option<u32>,
    /// V3 fee tier in hundredths of a basis point, if the DEX is V3.
    pub fee_tier: Option<u32>,
}

/// Extracts an `AggregatorPair` from one element of a `pairs[]` array
/// (or a single `pair` object). Returns `None` if required fields
/// (`chain`, `pairAddress`, `baseToken.address`, `quoteToken.address`)
/// are missing or malformed; everything else degrades to `None`.
pub fn parse_pair(value: &serde_json::Value) -> Option<AggregatorPair> {
    let chain_raw = value
        .get("chainId")
        .or_else(|| value.get("chain"))
        .and_then(|v| v.as_str())?;
    let chain: Chain = chain_raw.parse().ok()?;

    let pair_address: Address = value.get("pairAddress")?.as_str()?.parse().ok()?;
    let base_token: Address = value.get("baseToken")?.get("address")?.as_str()?.parse().ok()?;
    let quote_token: Address = value.get("quoteToken")?.get("address")?.as_str()?.parse().ok()?;
    let dex_id = value
        .get("dexId")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let price_usd = value
        .get("priceUsd")
        .and_then(|v| v.as_str().and_then(|s| s.parse().ok()).or_else(|| v.as_f64()));
    let liquidity_usd = value.get("liquidity").and_then(|l| l.get("usd")).and_then(|v| v.as_f64());

    let txns = value.get("txns");
    let buys_m5 = txns.and_then(|t| t.get("m5")).and_then(|m| m.get("buys")).and_then(|v| v.as_u64()).map(|v| v as u32);
    let sells_m5 = txns.and_then(|t| t.get("m5")).and_then(|m| m.get("sells")).and_then(|v| v.as_u64()).map(|v| v as u32);
    let buys_h1 = txns.and_then(|t| t.get("h1")).and_then(|m| m.get("buys")).and_then(|v| v.as_u64()).map(|v| v as u32);
    let sells_h1 = txns.and_then(|t| t.get("h1")).and_then(|m| m.get("sells")).and_then(|v| v.as_u64()).map(|v| v as u32);

    let fee_tier = value
        .get("feeTier")
        .or_else(|| value.get("fee"))
        .and_then(|v| v.as_u64())
        .map(|v| v as u32);

    Some(AggregatorPair {
        chain,
        pair_address,
        dex_id,
        base_token,
        quote_token,
        price_usd,
        liquidity_usd,
        buys_m5,
        sells_m5,
        buys_h1,
        sells_h1,
        fee_tier,
    })
}

/// Extracts every entry of a response's `pairs[]` array, skipping
/// entries that don't parse rather than failing the whole response.
pub fn parse_pairs(value: &serde_json::Value) -> Vec<AggregatorPair> {
    value
        .get("pairs")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(parse_pair).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair_reads_documented_fields() {
        let json = serde_json::json!({
            "chainId": "bsc",
            "pairAddress": "0x1111111111111111111111111111111111111111",
            "baseToken": {"address": "0x2222222222222222222222222222222222222222"},
            "quoteToken": {"address": "0x3333333333333333333333333333333333333333"},
            "dexId": "pancakeswap",
            "priceUsd": "1.25",
            "liquidity": {"usd": 50000.0},
            "txns": {"m5": {"buys": 3, "sells": 1}, "h1": {"buys": 20, "sells": 10}},
            "feeTier": 2500
        });
        let pair = parse_pair(&json).unwrap();
        assert_eq!(pair.chain, Chain::Bsc);
        assert_eq!(pair.price_usd, Some(1.25));
        assert_eq!(pair.liquidity_usd, Some(50000.0));
        assert_eq!(pair.buys_m5, Some(3));
        assert_eq!(pair.fee_tier, Some(2500));
    }

    #[test]
    fn test_parse_pair_missing_required_field_returns_none() {
        let json = serde_json::json!({"chainId": "bsc"});
        assert!(parse_pair(&json).is_none());
    }

    #[test]
    fn test_parse_pairs_skips_bad_entries() {
        let json = serde_json::json!({
            "pairs": [
                {"chainId": "bsc"},
                {
                    "chainId": "bsc",
                    "pairAddress": "0x1111111111111111111111111111111111111111",
                    "baseToken": {"address": "0x2222222222222222222222222222222222222222"},
                    "quoteToken": {"address": "0x3333333333333333333333333333333333333333"},
                }
            ]
        });
        let pairs = parse_pairs(&json);
        assert_eq!(pairs.len(), 1);
    }
}
