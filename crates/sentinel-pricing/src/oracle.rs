//! Base-token USD price oracle with a 30-second TTL cache.

use alloy::primitives::Address;
use dashmap::DashMap;
use sentinel_aggregator::AggregatorClient;
use sentinel_core::{BaseToken, Chain};
use std::time::{Duration, Instant};
use tracing::debug;

const CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    usd: f64,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) < CACHE_TTL
    }
}

/// Resolves USD prices for recognized base tokens (and, best-effort,
/// arbitrary tokens) via the market aggregator, with a 30s TTL cache
/// and a stablecoin fallback when the aggregator is unreachable.
pub struct PriceOracle {
    aggregator: AggregatorClient,
    cache: DashMap<(Chain, Address), CacheEntry>,
}

impl PriceOracle {
    pub fn new(aggregator: AggregatorClient) -> Self {
        Self {
            aggregator,
            cache: DashMap::new(),
        }
    }

    /// USD price for a recognized base token. Falls back to the
    /// stablecoin-equals-1.00 assumption if the aggregator is down and
    /// `token` is a stablecoin; otherwise propagates the failure as
    /// `None`.
    pub async fn get_base_token_usd(
        &self,
        chain: Chain,
        token: Address,
        base: BaseToken,
    ) -> Option<f64> {
        if let Some(price) = self.cached(chain, token) {
            return Some(price);
        }

        match self.aggregator.fetch_token(chain, token).await {
            Ok(pairs) => {
                let best = pairs
                    .into_iter()
                    .filter(|p| p.price_usd.is_some())
                    .max_by(|a, b| {
                        a.liquidity_usd
                            .unwrap_or(0.0)
                            .total_cmp(&b.liquidity_usd.unwrap_or(0.0))
                    });
                if let Some(pair) = best {
                    if let Some(usd) = pair.price_usd {
                        self.store(chain, token, usd);
                        return Some(usd);
                    }
                }
            }
            Err(e) => {
                debug!(chain = %chain, token = %token, error = %e, "aggregator unavailable for base token price");
            }
        }

        if base.is_stable() {
            self.store(chain, token, 1.0);
            return Some(1.0);
        }

        None
    }

    /// USD price for an arbitrary (non-base) token; `None` if the
    /// aggregator has no entry for it.
    pub async fn fetch_token_usd(&self, chain: Chain, token: Address) -> Option<f64> {
        if let Some(price) = self.cached(chain, token) {
            return Some(price);
        }
        let pairs = self.aggregator.fetch_token(chain, token).await.ok()?;
        let best = pairs
            .into_iter()
            .filter(|p| p.price_usd.is_some())
            .max_by(|a, b| {
                a.liquidity_usd
                    .unwrap_or(0.0)
                    .total_cmp(&b.liquidity_usd.unwrap_or(0.0))
            })?;
        let usd = best.price_usd?;
        self.store(chain, token, usd);
        Some(usd)
    }

    fn cached(&self, chain: Chain, token: Address) -> Option<f64> {
        let now = Instant::now();
        self.cache.get(&(chain, token)).and_then(|e| {
            if e.is_fresh(now) {
                Some(e.usd)
            } else {
                None
            }
        })
    }

    fn store(&self, chain: Chain, token: Address, usd: f64) {
        self.cache.insert(
            (chain, token),
            CacheEntry {
                usd,
                fetched_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_entry_freshness() {
        let entry = CacheEntry {
            usd: 1.0,
            fetched_at: Instant::now(),
        };
        assert!(entry.is_fresh(Instant::now()));
    }

    #[tokio::test]
    async fn test_stablecoin_fallback_when_aggregator_unreachable() {
        let aggregator = AggregatorClient::new("https://127.0.0.1:1").unwrap();
        let oracle = PriceOracle::new(aggregator);
        let usdt = Address::from([7u8; 20]);
        let price = oracle
            .get_base_token_usd(Chain::Bsc, usdt, BaseToken::Usdt)
            .await;
        assert_eq!(price, Some(1.0));
    }
}
