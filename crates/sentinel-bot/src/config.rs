//! Application configuration, loaded from the process environment (§6).

use crate::error::{AppError, AppResult};
use alloy::primitives::Address;
use sentinel_alerts::AlertConfig;
use sentinel_chain::DexFamilyConfig;
use sentinel_core::{BaseToken, BaseTokenEntry, Chain};
use sentinel_ingress::TrendingPollerConfig;
use sentinel_safety::GatePipelineConfig;
use std::str::FromStr;
use std::time::Duration;

fn addr(s: &str) -> Address {
    s.parse().unwrap_or_else(|e| panic!("invalid hardcoded address {s}: {e}"))
}

/// PancakeSwap V2 factory/router (BSC mainnet).
const PANCAKE_V2_FACTORY: &str = "0xcA143Ce32Fe78f1f7019d7d551a6402fC5350c73";
const PANCAKE_V2_ROUTER: &str = "0x10ED43C718714eb63d5aA57B78B54704E256024E";
/// PancakeSwap V3 factory/quoter (BSC mainnet).
const PANCAKE_V3_FACTORY: &str = "0x0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865";
const PANCAKE_V3_QUOTER: &str = "0xB048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997";

/// Uniswap V2 factory/router (Ethereum mainnet).
const UNISWAP_V2_FACTORY: &str = "0x5C69bee701ef814a2B6a3EDD4B1652CB9cc5aA6f";
const UNISWAP_V2_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";
/// Uniswap V3 factory/quoter (Ethereum mainnet).
const UNISWAP_V3_FACTORY: &str = "0x1F98431c8aD98523631AE4a59f267346ea31F984";
const UNISWAP_V3_QUOTER: &str = "0x61fFE014bA17989E743c5F6cB21bF9697530B21e";

const WBNB: &str = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";
const BSC_USDT: &str = "0x55d398326f99059fF775485246999027B3197955";
const BSC_USDC: &str = "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d";
const BSC_BUSD: &str = "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56";
const BSC_DAI: &str = "0x1AF3F329e8BE154074D8769D1FFa4eE058B1DBc3";

const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
const ETH_USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
const ETH_USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const ETH_DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

/// Everything the composition root needs, assembled once from the
/// environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bsc_wss: String,
    pub eth_wss: String,
    pub aggregator_base_url: String,
    pub gate: GatePipelineConfig,
    pub alerts: AlertConfig,
    pub max_active_markets: usize,
    pub trending: TrendingPollerConfig,
    pub max_tax_pct: f64,
}

impl AppConfig {
    /// Loads configuration from the process environment, applying an
    /// optional `.env` file first (via `dotenvy`) and the documented
    /// default for every unspecified field.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();

        let bsc_wss = require_env("BSC_WSS")?;
        let eth_wss = require_env("ETH_WSS")?;

        let min_liq_usd = env_f64("MIN_LIQ_USD", 5_000.0)?;
        let max_tax_pct = env_f64("MAX_TAX_PCT", 0.20)?;

        let alerts = AlertConfig {
            min_liq_usd,
            buy_vol_1m_usd: env_f64("BUY_VOL_1M_USD", 15_000.0)?,
            buy_txs_1m: env_u32("BUY_TXS_1M", 8)?,
            volume_multiplier: env_f64("VOLUME_MULTIPLIER", 5.0)?,
            fdv_multiplier: env_f64("FDV_MULTIPLIER", 3.0)?,
            whale_single_buy_usd: env_f64("WHALE_SINGLE_BUY_USD", 5_000.0)?,
            whale_liquidity_ratio: env_f64("WHALE_LIQUIDITY_RATIO", 0.03)?,
        };

        let trending = TrendingPollerConfig {
            poll_interval: Duration::from_millis(env_u64("TRENDING_POLL_INTERVAL_MS", 60_000)?),
            min_liquidity_usd: env_f64("TRENDING_MIN_LIQ_USD", 10_000.0)?,
            top_k: env_u32("TRENDING_TOP_K", 50)?,
        };

        Ok(Self {
            bsc_wss,
            eth_wss,
            aggregator_base_url: std::env::var("AGGREGATOR_BASE_URL")
                .unwrap_or_else(|_| "https://api.dexscreener.com".to_string()),
            gate: GatePipelineConfig {
                min_liq_usd,
                max_tax_pct,
            },
            alerts,
            max_active_markets: env_u64("MAX_ACTIVE_MARKETS", 200)? as usize,
            trending,
            max_tax_pct,
        })
    }

    /// DEX families watched per chain, keyed by the chain the factory
    /// and quoter contracts live on.
    pub fn dex_families(&self) -> Vec<(Chain, DexFamilyConfig)> {
        vec![
            (
                Chain::Bsc,
                DexFamilyConfig {
                    name: "pancakeswap".to_string(),
                    v2_factory: Some(addr(PANCAKE_V2_FACTORY)),
                    v2_router: Some(addr(PANCAKE_V2_ROUTER)),
                    v3_factory: Some(addr(PANCAKE_V3_FACTORY)),
                    v3_quoter: Some(addr(PANCAKE_V3_QUOTER)),
                },
            ),
            (
                Chain::Eth,
                DexFamilyConfig {
                    name: "uniswap".to_string(),
                    v2_factory: Some(addr(UNISWAP_V2_FACTORY)),
                    v2_router: Some(addr(UNISWAP_V2_ROUTER)),
                    v3_factory: Some(addr(UNISWAP_V3_FACTORY)),
                    v3_quoter: Some(addr(UNISWAP_V3_QUOTER)),
                },
            ),
        ]
    }

    /// Recognized base tokens, keyed by chain, used for pricing and
    /// sellability-probe path construction.
    pub fn base_token_entries(&self) -> Vec<BaseTokenEntry> {
        vec![
            BaseTokenEntry { token: BaseToken::Wbnb, chain: Chain::Bsc, address: addr(WBNB), decimals: 18 },
            BaseTokenEntry { token: BaseToken::Usdt, chain: Chain::Bsc, address: addr(BSC_USDT), decimals: 18 },
            BaseTokenEntry { token: BaseToken::Usdc, chain: Chain::Bsc, address: addr(BSC_USDC), decimals: 18 },
            BaseTokenEntry { token: BaseToken::Busd, chain: Chain::Bsc, address: addr(BSC_BUSD), decimals: 18 },
            BaseTokenEntry { token: BaseToken::Dai, chain: Chain::Bsc, address: addr(BSC_DAI), decimals: 18 },
            BaseTokenEntry { token: BaseToken::Weth, chain: Chain::Eth, address: addr(WETH), decimals: 18 },
            BaseTokenEntry { token: BaseToken::Usdt, chain: Chain::Eth, address: addr(ETH_USDT), decimals: 6 },
            BaseTokenEntry { token: BaseToken::Usdc, chain: Chain::Eth, address: addr(ETH_USDC), decimals: 6 },
            BaseTokenEntry { token: BaseToken::Dai, chain: Chain::Eth, address: addr(ETH_DAI), decimals: 18 },
        ]
    }
}

fn require_env(key: &str) -> AppResult<String> {
    std::env::var(key).map_err(|_| AppError::Config(format!("{key} is required")))
}

fn env_f64(key: &str, default: f64) -> AppResult<f64> {
    match std::env::var(key) {
        Ok(v) => f64::from_str(&v).map_err(|e| AppError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_u32(key: &str, default: u32) -> AppResult<u32> {
    match std::env::var(key) {
        Ok(v) => u32::from_str(&v).map_err(|e| AppError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_u64(key: &str, default: u64) -> AppResult<u64> {
    match std::env::var(key) {
        Ok(v) => u64::from_str(&v).map_err(|e| AppError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            bsc_wss: String::new(),
            eth_wss: String::new(),
            aggregator_base_url: String::new(),
            gate: GatePipelineConfig::default(),
            alerts: AlertConfig::default(),
            max_active_markets: 200,
            trending: TrendingPollerConfig::default(),
            max_tax_pct: 0.20,
        }
    }

    #[test]
    fn test_dex_families_cover_both_chains() {
        let families = sample().dex_families();
        assert_eq!(families.len(), 2);
        assert!(families.iter().any(|(c, _)| *c == Chain::Bsc));
        assert!(families.iter().any(|(c, _)| *c == Chain::Eth));
    }

    #[test]
    fn test_base_token_entries_cover_native_wrappers() {
        let entries = sample().base_token_entries();
        assert!(entries.iter().any(|e| e.token == BaseToken::Wbnb && e.chain == Chain::Bsc));
        assert!(entries.iter().any(|e| e.token == BaseToken::Weth && e.chain == Chain::Eth));
    }
}
