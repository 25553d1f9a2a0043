//! Per-token decimals cache (§4.5: "cached per (chain_id, token); on
//! lookup failure, fall back to 18").
//!
//! Decimals never change for a given token, so unlike [`crate::oracle`]
//! this cache has no TTL — a successful lookup is cached forever.

use alloy::primitives::Address;
use dashmap::DashMap;
use sentinel_chain::ChainClient;
use sentinel_core::Chain;
use tracing::debug;

const FALLBACK_DECIMALS: u8 = 18;

/// Caches `decimals()` reads so a hot market's swap handler doesn't
/// re-query the chain on every event.
#[derive(Default)]
pub struct DecimalsCache {
    cache: DashMap<(Chain, Address), u8>,
}

impl DecimalsCache {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Returns the cached value, or queries `client` and caches the
    /// result; falls back to 18 (and does not cache the fallback) if
    /// the call fails.
    pub async fn get_or_fetch(&self, client: &dyn ChainClient, token: Address) -> u8 {
        let chain = client.chain();
        if let Some(decimals) = self.cache.get(&(chain, token)) {
            return *decimals;
        }
        match client.get_decimals(token).await {
            Ok(decimals) => {
                self.cache.insert((chain, token), decimals);
                decimals
            }
            Err(e) => {
                debug!(%token, error = %e, "decimals lookup failed, falling back to 18");
                FALLBACK_DECIMALS
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_chain::{ChainError, ChainResult, FactoryCandidate, MarketEvent, Reserves, Slot0, SwapQuote};
    use alloy::primitives::U256;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct StubClient {
        decimals: u8,
        fail: bool,
    }

    #[async_trait]
    impl ChainClient for StubClient {
        fn chain(&self) -> Chain {
            Chain::Bsc
        }
        async fn get_code(&self, _address: Address) -> ChainResult<Vec<u8>> {
            Ok(vec![1])
        }
        async fn get_reserves(&self, _pair: Address) -> ChainResult<Reserves> {
            unimplemented!()
        }
        async fn get_slot0(&self, _pool: Address) -> ChainResult<Slot0> {
            unimplemented!()
        }
        async fn get_amounts_out(&self, _amount_in: U256, _path: &[Address]) -> ChainResult<SwapQuote> {
            unimplemented!()
        }
        async fn get_v3_pool(&self, _factory: Address, _token0: Address, _token1: Address, _fee: u32) -> ChainResult<Address> {
            unimplemented!()
        }
        async fn quote_exact_input_single(&self, _quoter: Address, _token_in: Address, _token_out: Address, _fee: u32, _amount_in: U256) -> ChainResult<SwapQuote> {
            unimplemented!()
        }
        async fn get_decimals(&self, _token: Address) -> ChainResult<u8> {
            if self.fail {
                Err(ChainError::RpcFailed("boom".into()))
            } else {
                Ok(self.decimals)
            }
        }
        async fn get_total_supply(&self, _token: Address) -> ChainResult<U256> {
            unimplemented!()
        }
        async fn subscribe_factory_events(&self, _tx: mpsc::Sender<FactoryCandidate>) -> ChainResult<()> {
            unimplemented!()
        }
        async fn subscribe_market_events(&self, _market: Address, _tx: mpsc::Sender<MarketEvent>) -> ChainResult<()> {
            unimplemented!()
        }
    }

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    #[tokio::test]
    async fn test_caches_successful_lookup() {
        let cache = DecimalsCache::new();
        let client = StubClient { decimals: 6, fail: false };
        assert_eq!(cache.get_or_fetch(&client, addr(1)).await, 6);
        assert_eq!(cache.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_18_on_failure_without_caching() {
        let cache = DecimalsCache::new();
        let client = StubClient { decimals: 6, fail: true };
        assert_eq!(cache.get_or_fetch(&client, addr(1)).await, 18);
        assert!(cache.cache.is_empty());
    }
}
