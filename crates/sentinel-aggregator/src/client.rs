//! HTTP client for the external market aggregator.
//!
//! Covers the three documented endpoints: per-token lookup, per-pair
//! lookup, and per-chain trending. Responses are treated as untyped
//! JSON; only the fields documented in [`crate::types`] are read, so
//! an aggregator schema change that adds or reorders fields elsewhere
//! never breaks this client.

use crate::error::{AggregatorError, AggregatorResult};
use crate::types::{parse_pair, parse_pairs, AggregatorPair};
use alloy::primitives::Address;
use reqwest::Client;
use sentinel_chain::{retry_with_backoff, BackoffConfig};
use sentinel_core::{BaseToken, Chain};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the market aggregator's HTTP API.
pub struct AggregatorClient {
    client: Client,
    base_url: String,
    backoff: BackoffConfig,
}

impl AggregatorClient {
    pub fn new(base_url: impl Into<String>) -> AggregatorResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AggregatorError::HttpClient(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            backoff: BackoffConfig {
                base_delay_ms: 250,
                max_delay_ms: 5_000,
                max_attempts: 3,
            },
        })
    }

    /// `GET /latest/dex/tokens/{token}`.
    pub async fn fetch_token(&self, chain: Chain, token: Address) -> AggregatorResult<Vec<AggregatorPair>> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, token);
        let body = self.get_json("fetch_token", &url).await?;
        let pairs: Vec<AggregatorPair> = parse_pairs(&body)
            .into_iter()
            .filter(|p| p.chain == chain)
            .collect();
        Ok(pairs)
    }

    /// `GET /latest/dex/pairs/{chain_slug}/{pair}`.
    pub async fn fetch_pair(&self, chain: Chain, pair: Address) -> AggregatorResult<Option<AggregatorPair>> {
        let url = format!("{}/latest/dex/pairs/{}/{}", self.base_url, chain.slug(), pair);
        let body = self.get_json("fetch_pair", &url).await?;
        if let Some(single) = body.get("pair") {
            return Ok(parse_pair(single));
        }
        Ok(parse_pairs(&body).into_iter().next())
    }

    /// `GET /latest/dex/trending?chain={slug}&limit={k}`.
    ///
    /// On failure, callers should fall back to
    /// [`AggregatorClient::synthesize_trending`] (§4.1's graceful
    /// degradation path) rather than treating this as a hard error.
    pub async fn fetch_trending(&self, chain: Chain, limit: u32) -> AggregatorResult<Vec<AggregatorPair>> {
        let url = format!(
            "{}/latest/dex/trending?chain={}&limit={}",
            self.base_url,
            chain.slug(),
            limit
        );
        let body = self.get_json("fetch_trending", &url).await?;
        Ok(parse_pairs(&body))
    }

    /// Synthesizes a trending-like candidate list by querying the top
    /// pools of each recognized base token, used when the trending
    /// endpoint itself is unavailable. `base_addresses` maps each base
    /// token to its on-chain address, in the priority order the
    /// sentinel prefers to probe.
    pub async fn synthesize_trending(
        &self,
        chain: Chain,
        base_addresses: &[(BaseToken, Address)],
    ) -> Vec<AggregatorPair> {
        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (base, address) in base_addresses {
            debug!(chain = %chain, base = %base, "synthesizing trending from base token pools");
            match self.fetch_token(chain, *address).await {
                Ok(pairs) => {
                    for pair in pairs {
                        if seen.insert(pair.pair_address) {
                            out.push(pair);
                        }
                    }
                }
                Err(e) => warn!(chain = %chain, base = %base, error = %e, "synthesized trending probe failed"),
            }
        }
        out
    }

    async fn get_json(&self, op: &str, url: &str) -> AggregatorResult<serde_json::Value> {
        let client = &self.client;
        let url = url.to_string();
        retry_with_backoff(&self.backoff, op, || {
            let client = client.clone();
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| AggregatorError::HttpClient(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(AggregatorError::HttpClient(format!("HTTP {status}")));
                }

                response
                    .json::<serde_json::Value>()
                    .await
                    .map_err(|e| AggregatorError::HttpClient(e.to_string()))
            }
        })
        .await
        .map_err(|e| {
            warn!(op, url, error = %e, "aggregator request exhausted retries");
            e
        })
    }
}
