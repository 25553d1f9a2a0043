//! Individual safety checks (§4.2 steps 1-5).
//!
//! Each probe returns `Err(RejectReason)` for a conclusive failure
//! (either the on-chain check itself failed, or an RPC error occurred
//! — per the documented intent, probe errors are never treated as a
//! silent pass). Callers run probes in the pipeline's fixed order and
//! stop at the first failure.

use alloy::primitives::{Address, U256};
use sentinel_chain::ChainClient;
use sentinel_core::{BaseToken, BaseTokenTable, Chain, RejectReason, Usd};
use tracing::debug;

/// Step 1: bytecode presence on the pool and both tokens.
pub async fn check_bytecode(
    client: &dyn ChainClient,
    pair: Address,
    token0: Address,
    token1: Address,
) -> Result<(), RejectReason> {
    for address in [pair, token0, token1] {
        match client.get_code(address).await {
            Ok(code) if !code.is_empty() => continue,
            _ => {
                debug!(%address, "no bytecode at address");
                return Err(RejectReason::NoBytecode);
            }
        }
    }
    Ok(())
}

/// Step 2 (V2 branch): USD liquidity from reserves when one side is a
/// recognized base token with a known USD price; `None` means the
/// caller should fall back to the aggregator's reported liquidity.
pub fn estimate_v2_liquidity_usd(
    chain: Chain,
    base_tokens: &BaseTokenTable,
    token0: Address,
    token1: Address,
    reserve0: U256,
    reserve1: U256,
    decimals0: u8,
    decimals1: u8,
    base_usd: impl Fn(BaseToken) -> Option<f64>,
) -> Option<Usd> {
    if let Some(entry) = base_tokens.resolve(chain, token1) {
        let usd = base_usd(entry.token)?;
        let reserve1_norm = sentinel_core::normalize_amount(&reserve1.to_string(), decimals1)?;
        return Some(Usd::new(2.0 * reserve1_norm * usd));
    }
    if let Some(entry) = base_tokens.resolve(chain, token0) {
        let usd = base_usd(entry.token)?;
        let reserve0_norm = sentinel_core::normalize_amount(&reserve0.to_string(), decimals0)?;
        return Some(Usd::new(2.0 * reserve0_norm * usd));
    }
    // Neither side is a recognized base token: the relative price alone
    // can't be converted to USD.
    None
}

/// Step 4: LP-risk score. Start at 0; +2 if neither side is a
/// recognized base token; +2 if liquidity < 3000 USD; +1 if in
/// [3000, 8000).
pub fn lp_risk_score(has_base_token: bool, liquidity_usd: Option<f64>) -> u32 {
    let mut score = 0;
    if !has_base_token {
        score += 2;
    }
    match liquidity_usd {
        Some(usd) if usd < 3000.0 => score += 2,
        Some(usd) if usd < 8000.0 => score += 1,
        _ => {}
    }
    score
}

/// Probe amount for sellability checks: `10^max(0, decimals-6)`, floor 1.
pub fn probe_amount(decimals: u8) -> U256 {
    let exponent = decimals.saturating_sub(6);
    if exponent == 0 {
        U256::from(1u64)
    } else {
        U256::from(10u64).pow(U256::from(exponent))
    }
}

/// Step 3 (V2 branch): try 1-hop and 2-hop paths to every base token in
/// priority order; pass if any path returns a positive quote.
pub async fn check_sellability_v2(
    client: &dyn ChainClient,
    token: Address,
    decimals: u8,
    base_addresses_in_priority: &[Address],
) -> Result<(), RejectReason> {
    let amount_in = probe_amount(decimals);

    for &base in base_addresses_in_priority {
        let path = vec![token, base];
        if let Ok(quote) = client.get_amounts_out(amount_in, &path).await {
            if quote.amount_out > U256::ZERO {
                return Ok(());
            }
        }
    }

    for &mid in base_addresses_in_priority {
        for &dst in base_addresses_in_priority {
            if mid == dst {
                continue;
            }
            let path = vec![token, mid, dst];
            if let Ok(quote) = client.get_amounts_out(amount_in, &path).await {
                if quote.amount_out > U256::ZERO {
                    return Ok(());
                }
            }
        }
    }

    debug!(%token, "no v2 path returned a positive quote");
    Err(RejectReason::Unsellable)
}

/// Step 3 (V3 branch): verify the factory resolves to the observed
/// pool, then probe the quoter at increasing probe amounts.
pub async fn check_sellability_v3(
    client: &dyn ChainClient,
    factory: Address,
    quoter: Address,
    observed_pool: Address,
    token0: Address,
    token1: Address,
    fee: u32,
    target: Address,
    base_in_pool: Address,
    decimals: u8,
) -> Result<(), RejectReason> {
    let resolved = client
        .get_v3_pool(factory, token0, token1, fee)
        .await
        .map_err(|_| RejectReason::Unsellable)?;
    if resolved != observed_pool {
        debug!(%observed_pool, %resolved, "factory does not confirm observed pool");
        return Err(RejectReason::Unsellable);
    }

    let base_probe = probe_amount(decimals);
    for multiplier in [1u64, 10, 100] {
        let amount_in = base_probe * U256::from(multiplier);
        if let Ok(quote) = client
            .quote_exact_input_single(quoter, target, base_in_pool, fee, amount_in)
            .await
        {
            if quote.amount_out > U256::ZERO {
                return Ok(());
            }
        }
    }

    debug!(%target, "no v3 quoter probe returned a positive quote");
    Err(RejectReason::Unsellable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{BaseTokenEntry, Chain};

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    #[test]
    fn test_probe_amount_floors_at_one() {
        assert_eq!(probe_amount(5), U256::from(1u64));
        assert_eq!(probe_amount(6), U256::from(1u64));
    }

    #[test]
    fn test_probe_amount_scales_above_six_decimals() {
        assert_eq!(probe_amount(8), U256::from(100u64));
    }

    #[test]
    fn test_lp_risk_score_no_base_token_and_low_liquidity() {
        assert_eq!(lp_risk_score(false, Some(1000.0)), 4);
    }

    #[test]
    fn test_lp_risk_score_mid_liquidity_with_base_token() {
        assert_eq!(lp_risk_score(true, Some(5000.0)), 1);
    }

    #[test]
    fn test_lp_risk_score_healthy_market() {
        assert_eq!(lp_risk_score(true, Some(50_000.0)), 0);
    }

    #[test]
    fn test_estimate_v2_liquidity_usd_prefers_base_side() {
        let table = BaseTokenTable::new(vec![BaseTokenEntry {
            token: BaseToken::Usdt,
            chain: Chain::Bsc,
            address: addr(2),
            decimals: 18,
        }]);
        let liquidity = estimate_v2_liquidity_usd(
            Chain::Bsc,
            &table,
            addr(1),
            addr(2),
            U256::from(10u64).pow(U256::from(24u64)),
            U256::from(10_000u64) * U256::from(10u64).pow(U256::from(18u64)),
            18,
            18,
            |_| Some(1.0),
        )
        .unwrap();
        assert_eq!(liquidity, Usd::new(20_000.0));
    }

    #[test]
    fn test_estimate_v2_liquidity_usd_none_without_base_token() {
        let table = BaseTokenTable::new(vec![]);
        let liquidity = estimate_v2_liquidity_usd(
            Chain::Bsc,
            &table,
            addr(1),
            addr(2),
            U256::from(1_000u64),
            U256::from(2_000u64),
            18,
            18,
            |_| Some(1.0),
        );
        assert!(liquidity.is_none());
    }
}
