//! Translates raw chain swap events into the normalized trade shape
//! the rest of the pipeline consumes (§4.3 steps 1-4).

use alloy::primitives::Address;
use sentinel_chain::{V2SwapEvent, V3SwapEvent};
use sentinel_core::{BaseTokenTable, Chain};

/// A swap normalized to the pool's "target" side (the side that isn't
/// a recognized base token), independent of V2/V3 wire shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSwap {
    /// `true` if `token0` is the target side.
    pub target_is_token0: bool,
    /// Signed delta of the target token, in its natural (decimals-
    /// divided) unit, from the trader's perspective: positive = buy.
    pub delta_target: f64,
    /// Magnitude of the non-target side's delta, in its natural unit.
    pub delta_base: f64,
    pub is_buy: bool,
    pub buyer: Address,
}

/// Step 1: which side is "target" — the one that is NOT a recognized
/// base token. Defaults to `token0` if both or neither side is base.
pub fn target_is_token0(
    base_tokens: &BaseTokenTable,
    chain: Chain,
    token0: Address,
    token1: Address,
) -> bool {
    let t0_base = base_tokens.is_base_token(chain, token0);
    let t1_base = base_tokens.is_base_token(chain, token1);
    match (t0_base, t1_base) {
        (false, true) => true,
        (true, false) => false,
        _ => true,
    }
}

/// Step 2-3 (V2 branch). `None` if the chosen target delta is zero
/// (no-op swap, shouldn't happen but guards divide-by-zero downstream).
pub fn normalize_v2_swap(
    event: &V2SwapEvent,
    target_is_token0: bool,
    decimals_target: u8,
    decimals_base: u8,
) -> Option<NormalizedSwap> {
    let (raw_target, is_out) = if target_is_token0 {
        event.delta0()
    } else {
        event.delta1()
    };
    let (raw_base, _) = if target_is_token0 {
        event.delta1()
    } else {
        event.delta0()
    };
    let magnitude = sentinel_core::normalize_amount(&raw_target.to_string(), decimals_target)?;
    if magnitude == 0.0 {
        return None;
    }
    let delta_base = sentinel_core::normalize_amount(&raw_base.to_string(), decimals_base).unwrap_or(0.0);
    let delta_target = if is_out { -magnitude } else { magnitude };
    let is_buy = delta_target > 0.0;
    let buyer = if is_buy { event.to } else { event.sender };
    Some(NormalizedSwap {
        target_is_token0,
        delta_target,
        delta_base,
        is_buy,
        buyer,
    })
}

/// Step 2-3 (V3 branch). `Δ_target = -amount_target / 10^dec_target`
/// from the trader's perspective (the pool's signed amount is from the
/// pool's perspective, so it is negated).
pub fn normalize_v3_swap(
    event: &V3SwapEvent,
    target_is_token0: bool,
    decimals_target: u8,
    decimals_base: u8,
) -> Option<NormalizedSwap> {
    let (signed_target, signed_base) = if target_is_token0 {
        (event.amount0, event.amount1)
    } else {
        (event.amount1, event.amount0)
    };
    let magnitude = sentinel_core::normalize_amount(&signed_target.unsigned_abs().to_string(), decimals_target)?;
    if magnitude == 0.0 {
        return None;
    }
    let delta_base = sentinel_core::normalize_amount(&signed_base.unsigned_abs().to_string(), decimals_base).unwrap_or(0.0);
    let delta_target = if signed_target.is_negative() {
        magnitude
    } else {
        -magnitude
    };
    let is_buy = delta_target > 0.0;
    let buyer = if is_buy { event.recipient } else { event.sender };
    Some(NormalizedSwap {
        target_is_token0,
        delta_target,
        delta_base,
        is_buy,
        buyer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{I256, U256};
    use sentinel_core::{BaseToken, BaseTokenEntry};

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    #[test]
    fn test_target_prefers_non_base_side() {
        let table = BaseTokenTable::new(vec![BaseTokenEntry {
            token: BaseToken::Wbnb,
            chain: Chain::Bsc,
            address: addr(2),
            decimals: 18,
        }]);
        assert!(target_is_token0(&table, Chain::Bsc, addr(1), addr(2)));
        assert!(!target_is_token0(&table, Chain::Bsc, addr(2), addr(1)));
    }

    #[test]
    fn test_target_defaults_to_token0_when_neither_is_base() {
        let table = BaseTokenTable::new(vec![]);
        assert!(target_is_token0(&table, Chain::Bsc, addr(1), addr(2)));
    }

    #[test]
    fn test_v2_swap_buy_direction_and_buyer() {
        let event = V2SwapEvent {
            pool: addr(9),
            sender: addr(5),
            to: addr(6),
            amount0_in: U256::ZERO,
            amount1_in: U256::from(1_000_000u64),
            amount0_out: U256::from(1_000_000_000_000_000_000u64),
            amount1_out: U256::ZERO,
        };
        let swap = normalize_v2_swap(&event, true, 18, 18).unwrap();
        assert!(swap.is_buy);
        assert_eq!(swap.buyer, addr(6));
        assert!(swap.delta_target > 0.0);
        assert!(swap.delta_base > 0.0);
    }

    #[test]
    fn test_v3_swap_sell_direction_and_buyer() {
        let event = V3SwapEvent {
            pool: addr(9),
            sender: addr(5),
            recipient: addr(6),
            amount0: I256::try_from(1_000_000_000_000_000_000i64).unwrap(),
            amount1: I256::try_from(-250_000i64).unwrap(),
            sqrt_price_x96: U256::from(1u64) << 96,
            liquidity: 0,
            tick: 0,
        };
        let swap = normalize_v3_swap(&event, true, 18, 18).unwrap();
        assert!(!swap.is_buy);
        assert_eq!(swap.buyer, addr(5));
    }
}
