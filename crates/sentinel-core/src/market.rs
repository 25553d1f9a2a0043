//! Market identification types.
//!
//! A market is a DEX pair or pool: a chain, a pool-type family (V2
//! constant-product or V3 concentrated-liquidity), and the pool/pair
//! contract address itself.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain the market lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Bsc,
    Eth,
}

impl Chain {
    /// All chains the sentinel watches, in the order ingress should poll them.
    pub const ALL: [Chain; 2] = [Chain::Bsc, Chain::Eth];

    /// EVM chain ID.
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Bsc => 56,
            Chain::Eth => 1,
        }
    }

    /// Dexscreener-style chain slug used by the aggregator's HTTP API.
    pub fn slug(&self) -> &'static str {
        match self {
            Chain::Bsc => "bsc",
            Chain::Eth => "ethereum",
        }
    }

}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Chain {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bsc" | "bnb" | "56" => Ok(Chain::Bsc),
            "eth" | "ethereum" | "1" => Ok(Chain::Eth),
            other => Err(crate::error::CoreError::UnknownChain(other.to_string())),
        }
    }
}

/// Pool architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Constant-product AMM (`getReserves`, `PairCreated`).
    V2,
    /// Concentrated-liquidity AMM (`slot0`, `PoolCreated`).
    V3,
}

impl MarketType {
    pub fn is_v2(&self) -> bool {
        matches!(self, MarketType::V2)
    }

    pub fn is_v3(&self) -> bool {
        matches!(self, MarketType::V3)
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::V2 => write!(f, "v2"),
            MarketType::V3 => write!(f, "v3"),
        }
    }
}

/// Unique market identifier: chain + pool family + pool/pair address.
///
/// This is the primary key for every per-market data structure in the
/// sentinel (watchlist entries, window stores, gate state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    pub chain: Chain,
    pub market_type: MarketType,
    pub address: Address,
}

impl MarketKey {
    pub fn new(chain: Chain, market_type: MarketType, address: Address) -> Self {
        Self {
            chain,
            market_type,
            address,
        }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chain, self.market_type, self.address)
    }
}

/// A recognized base/quote token: the closed set the sentinel uses to
/// price everything else and to decide which side of a pool is "the
/// target" for sellability and tax probes.
///
/// Immutable after process start; addresses are wired once at startup
/// from environment configuration (see `sentinel-bot`'s `AppConfig`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BaseToken {
    Wbnb,
    Weth,
    Usdt,
    Usdc,
    Dai,
    Busd,
}

impl BaseToken {
    /// Priority order used when choosing candidate router paths and
    /// when preferring one side's USD derivation over the other.
    /// Native wrapper first, then stables in descending liquidity.
    pub fn priority_order(chain: Chain) -> &'static [BaseToken] {
        match chain {
            Chain::Bsc => &[
                BaseToken::Wbnb,
                BaseToken::Usdt,
                BaseToken::Usdc,
                BaseToken::Busd,
                BaseToken::Dai,
            ],
            Chain::Eth => &[
                BaseToken::Weth,
                BaseToken::Usdt,
                BaseToken::Usdc,
                BaseToken::Dai,
            ],
        }
    }

    /// Whether this token is a USD stablecoin (used for the 1.00
    /// fallback price when the aggregator is unreachable).
    pub fn is_stable(&self) -> bool {
        matches!(
            self,
            BaseToken::Usdt | BaseToken::Usdc | BaseToken::Dai | BaseToken::Busd
        )
    }

    /// Whether this token is the chain's native wrapper (WBNB on BSC,
    /// WETH on Ethereum).
    pub fn is_native_wrapper(&self) -> bool {
        matches!(self, BaseToken::Wbnb | BaseToken::Weth)
    }
}

impl fmt::Display for BaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BaseToken::Wbnb => "WBNB",
            BaseToken::Weth => "WETH",
            BaseToken::Usdt => "USDT",
            BaseToken::Usdc => "USDC",
            BaseToken::Dai => "DAI",
            BaseToken::Busd => "BUSD",
        };
        write!(f, "{s}")
    }
}

/// A resolved base token together with the chain-specific contract
/// address it maps to, and the USD price last observed for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseTokenEntry {
    pub token: BaseToken,
    pub chain: Chain,
    pub address: Address,
    pub decimals: u8,
}

/// A static table resolving recognized base tokens to their on-chain
/// addresses, keyed by chain. Built once at startup from environment
/// configuration and never mutated afterward.
#[derive(Debug, Clone, Default)]
pub struct BaseTokenTable {
    entries: Vec<BaseTokenEntry>,
}

impl BaseTokenTable {
    pub fn new(entries: Vec<BaseTokenEntry>) -> Self {
        Self { entries }
    }

    /// Look up which recognized base token (if any) an address
    /// corresponds to on a given chain.
    pub fn resolve(&self, chain: Chain, address: Address) -> Option<&BaseTokenEntry> {
        self.entries
            .iter()
            .find(|e| e.chain == chain && e.address == address)
    }

    /// Address for a recognized base token on a given chain, if the
    /// table was configured with one.
    pub fn address_of(&self, chain: Chain, token: BaseToken) -> Option<Address> {
        self.entries
            .iter()
            .find(|e| e.chain == chain && e.token == token)
            .map(|e| e.address)
    }

    pub fn is_base_token(&self, chain: Chain, address: Address) -> bool {
        self.resolve(chain, address).is_some()
    }
}
