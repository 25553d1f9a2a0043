//! The `ChainClient` trait: the single seam between the rest of the
//! workspace and the actual EVM RPC/websocket transport.
//!
//! Every other crate (safety probes, pricing, ingress) depends only on
//! this trait, never on `alloy` directly, so they can be driven in
//! tests with `mockall`-generated fakes instead of a live node.

use crate::error::ChainResult;
use crate::events::{PoolCreatedEvent, Reserves, Slot0, V2MintEvent, V2SwapEvent, V3SwapEvent};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use sentinel_core::Chain;
use tokio::sync::mpsc;

/// A quote returned by a V2 router's `getAmountsOut` or a V3 quoter's
/// `quoteExactInputSingle`, normalized to a single output amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_out: U256,
}

/// An event delivered by a factory subscription: a brand new pair/pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactoryCandidate {
    pub chain: Chain,
    pub event: PoolCreatedEvent,
}

/// An event delivered by a per-market subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarketEvent {
    V2Swap(V2SwapEvent),
    V2Mint(V2MintEvent),
    V3Swap(V3SwapEvent),
}

/// Abstraction over everything the sentinel needs to read from or
/// subscribe to on a single EVM chain.
///
/// Implementations are expected to retry transient RPC failures
/// internally (see [`crate::backoff`]); callers treat an `Err` as
/// exhausted retries, not a single failed attempt.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn chain(&self) -> Chain;

    /// `eth_getCode`; used by the bytecode-presence safety probe.
    async fn get_code(&self, address: Address) -> ChainResult<Vec<u8>>;

    /// `getReserves()` on a V2 pair.
    async fn get_reserves(&self, pair: Address) -> ChainResult<Reserves>;

    /// `slot0()` on a V3 pool.
    async fn get_slot0(&self, pool: Address) -> ChainResult<Slot0>;

    /// `getAmountsOut(amountIn, path)` on the chain's standard V2 router.
    async fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> ChainResult<SwapQuote>;

    /// `factory.getPool(token0, token1, fee)` on a V3 factory; returns
    /// the pool address it resolves to (zero address if none).
    async fn get_v3_pool(
        &self,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: u32,
    ) -> ChainResult<Address>;

    /// `quoteExactInputSingle(tokenIn, tokenOut, fee, amountIn, 0)` on a
    /// V3 quoter.
    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> ChainResult<SwapQuote>;

    /// ERC-20 `decimals()`.
    async fn get_decimals(&self, token: Address) -> ChainResult<u8>;

    /// ERC-20 `totalSupply()`.
    async fn get_total_supply(&self, token: Address) -> ChainResult<U256>;

    /// Subscribes to `PairCreated`/`PoolCreated` logs for every
    /// configured DEX family on this chain, forwarding normalized
    /// candidates to `tx` until the returned handle is dropped or the
    /// subscription errors.
    async fn subscribe_factory_events(
        &self,
        tx: mpsc::Sender<FactoryCandidate>,
    ) -> ChainResult<()>;

    /// Subscribes to swap/mint logs for a single market.
    async fn subscribe_market_events(
        &self,
        market: Address,
        tx: mpsc::Sender<MarketEvent>,
    ) -> ChainResult<()>;
}
