//! EVM log event shapes this crate decodes.
//!
//! Topic0 signatures are the keccak256 hash of the canonical event
//! signature string, matched against `other_examples`' substreams-style
//! V3 swap decoder (`SWAP_EVENT_SIG`) and the standard Uniswap V2/V3
//! ABIs.

use alloy::primitives::{keccak256, Address, B256, U256};
use once_cell::sync::Lazy;
use sentinel_core::MarketType;

/// `PairCreated(address,address,address,uint256)` on a V2 factory.
pub static PAIR_CREATED_SIG: Lazy<B256> =
    Lazy::new(|| keccak256(b"PairCreated(address,address,address,uint256)"));

/// `PoolCreated(address,address,uint24,int24,address)` on a V3 factory.
pub static POOL_CREATED_SIG: Lazy<B256> =
    Lazy::new(|| keccak256(b"PoolCreated(address,address,uint24,int24,address)"));

/// `Swap(address,uint256,uint256,uint256,uint256,address)` on a V2 pair.
pub static V2_SWAP_SIG: Lazy<B256> = Lazy::new(|| {
    keccak256(b"Swap(address,uint256,uint256,uint256,uint256,address)")
});

/// `Mint(address,uint256,uint256)` on a V2 pair.
pub static V2_MINT_SIG: Lazy<B256> = Lazy::new(|| keccak256(b"Mint(address,uint256,uint256)"));

/// `Swap(address,address,int256,int256,uint160,uint128,int24)` on a V3 pool.
pub static V3_SWAP_SIG: Lazy<B256> = Lazy::new(|| {
    keccak256(b"Swap(address,address,int256,int256,uint160,uint128,int24)")
});

/// A newly created V2 pair or V3 pool, normalized across both factory
/// event shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolCreatedEvent {
    pub market_type: MarketType,
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    /// V3 only; hundredths of a basis point.
    pub fee: Option<u32>,
}

/// Raw reserves read from a V2 pair's `Swap` log or `getReserves()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2SwapEvent {
    pub pool: Address,
    pub sender: Address,
    pub to: Address,
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
}

impl V2SwapEvent {
    /// Signed delta of token0 from the pool's perspective of the
    /// trader: positive means the trader sold token0 into the pool.
    pub fn delta0(&self) -> (U256, bool) {
        if self.amount0_in > self.amount0_out {
            (self.amount0_in - self.amount0_out, true)
        } else {
            (self.amount0_out - self.amount0_in, false)
        }
    }

    pub fn delta1(&self) -> (U256, bool) {
        if self.amount1_in > self.amount1_out {
            (self.amount1_in - self.amount1_out, true)
        } else {
            (self.amount1_out - self.amount1_in, false)
        }
    }
}

/// A V2 pair's `Mint(address,uint256,uint256)` liquidity-add event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2MintEvent {
    pub pool: Address,
    pub sender: Address,
    pub amount0: U256,
    pub amount1: U256,
}

/// A V3 pool's `Swap` log, carrying the post-swap `sqrtPriceX96`
/// needed to recompute the pool's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V3SwapEvent {
    pub pool: Address,
    pub sender: Address,
    pub recipient: Address,
    /// Signed; positive means the pool received token0.
    pub amount0: alloy::primitives::I256,
    /// Signed; positive means the pool received token1.
    pub amount1: alloy::primitives::I256,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
}

impl V3SwapEvent {
    pub fn is_buy_of_token0(&self) -> bool {
        self.amount0.is_negative()
    }
}

/// Reserves snapshot for a V2 pair, as returned by `getReserves()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
}

/// `slot0()` response for a V3 pool; only the fields this sentinel uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    #[test]
    fn test_v2_swap_delta_direction() {
        let ev = V2SwapEvent {
            pool: addr(1),
            sender: addr(2),
            to: addr(3),
            amount0_in: U256::from(0u64),
            amount1_in: U256::from(1_000u64),
            amount0_out: U256::from(500u64),
            amount1_out: U256::from(0u64),
        };
        let (amt, is_out) = ev.delta0();
        assert_eq!(amt, U256::from(500u64));
        assert!(!is_out, "token0 left the pool to the trader");
    }

    #[test]
    fn test_v3_swap_direction_from_signed_amount0() {
        let ev = V3SwapEvent {
            pool: addr(1),
            sender: addr(2),
            recipient: addr(3),
            amount0: alloy::primitives::I256::try_from(-100i64).unwrap(),
            amount1: alloy::primitives::I256::try_from(250i64).unwrap(),
            sqrt_price_x96: U256::from(1u64) << 96,
            liquidity: 0,
            tick: 0,
        };
        assert!(ev.is_buy_of_token0());
    }
}
