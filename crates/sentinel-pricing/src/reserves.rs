//! Relative-price formulas for V2 reserves and V3 `sqrtPriceX96`.
//!
//! Confirmed against `other_examples`' substreams-style V3 swap
//! decoder, which documents the same
//! `(sqrtPriceX96/2^96)^2 * 10^(dec0-dec1)` formula client-side.

use alloy::primitives::U256;
use sentinel_core::{decimal::normalize_amount, BaseToken};

/// V2 constant-product relative price: token0 denominated in token1.
/// `None` if either normalized reserve is non-positive.
pub fn v2_price_token0_in_token1(
    reserve0: U256,
    reserve1: U256,
    decimals0: u8,
    decimals1: u8,
) -> Option<f64> {
    let r0 = normalize_amount(&reserve0.to_string(), decimals0)?;
    let r1 = normalize_amount(&reserve1.to_string(), decimals1)?;
    if r0 <= 0.0 || r1 <= 0.0 {
        return None;
    }
    Some(r1 / r0)
}

pub fn v2_price_token1_in_token0(
    reserve0: U256,
    reserve1: U256,
    decimals0: u8,
    decimals1: u8,
) -> Option<f64> {
    v2_price_token0_in_token1(reserve0, reserve1, decimals0, decimals1).map(|p| 1.0 / p)
}

/// V3 concentrated-liquidity relative price: token1 per token0.
/// `None` if the computed price isn't finite and positive.
pub fn v3_price_token1_per_token0(sqrt_price_x96: U256, decimals0: u8, decimals1: u8) -> Option<f64> {
    let sqrt_price_x96_f64: f64 = sqrt_price_x96.to_string().parse().ok()?;
    let sp = sqrt_price_x96_f64 / 2f64.powi(96);
    let raw = sp * sp;
    let decimal_adjustment = 10f64.powi(decimals0 as i32 - decimals1 as i32);
    let price = raw * decimal_adjustment;
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    Some(price)
}

pub fn v3_price_token0_per_token1(sqrt_price_x96: U256, decimals0: u8, decimals1: u8) -> Option<f64> {
    v3_price_token1_per_token0(sqrt_price_x96, decimals0, decimals1).map(|p| 1.0 / p)
}

/// Derives a USD price for the non-base side of a pool from the
/// relative price and the base token's known USD price. When both
/// sides are recognized base tokens, the caller should prefer the
/// higher-priority one (see [`BaseToken::priority_order`]); this
/// function just performs the multiplication for one side.
pub fn derive_counterpart_usd(relative_counterpart_in_base: f64, base_usd: f64) -> f64 {
    relative_counterpart_in_base * base_usd
}

/// Picks which of two recognized base tokens should be used for USD
/// derivation when a pool is base/base, per the documented priority
/// order (native wrapper, then stables by descending liquidity).
pub fn preferred_base(chain: sentinel_core::Chain, a: BaseToken, b: BaseToken) -> BaseToken {
    let order = BaseToken::priority_order(chain);
    let rank = |t: BaseToken| order.iter().position(|&x| x == t).unwrap_or(usize::MAX);
    if rank(a) <= rank(b) {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::Chain;

    #[test]
    fn test_v2_price_matches_documented_example() {
        // Pair reserves (1e24, 2e21), decimals (18, 18): price(token0 in token1) = 0.002
        let p = v2_price_token0_in_token1(
            U256::from(10u64).pow(U256::from(24u64)),
            U256::from(2u64) * U256::from(10u64).pow(U256::from(21u64)),
            18,
            18,
        )
        .unwrap();
        assert!((p - 0.002).abs() < 1e-9);
    }

    #[test]
    fn test_v2_price_undefined_on_zero_reserve() {
        assert!(v2_price_token0_in_token1(U256::ZERO, U256::from(100u64), 18, 18).is_none());
    }

    #[test]
    fn test_v3_price_unity_at_q96() {
        let sqrt_price_x96 = U256::from(1u64) << 96; // sp = 1.0
        let price = v3_price_token1_per_token0(sqrt_price_x96, 18, 18).unwrap();
        assert!((price - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_v3_price_applies_decimal_adjustment() {
        let sqrt_price_x96 = U256::from(1u64) << 96;
        // token0 has 6 decimals (e.g. USDC), token1 has 18: price *= 10^(6-18)
        let price = v3_price_token1_per_token0(sqrt_price_x96, 6, 18).unwrap();
        assert!((price - 1e-12).abs() < 1e-20);
    }

    #[test]
    fn test_preferred_base_prefers_native_wrapper() {
        assert_eq!(
            preferred_base(Chain::Bsc, BaseToken::Usdt, BaseToken::Wbnb),
            BaseToken::Wbnb
        );
    }
}
