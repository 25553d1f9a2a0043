//! Thresholds driving the derived-signal and scoring model (§4.7).

/// Tunable thresholds for `AlertEvaluator`. Populated from `AppConfig`
/// at the composition root; every field has the documented default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    pub min_liq_usd: f64,
    pub buy_vol_1m_usd: f64,
    pub buy_txs_1m: u32,
    pub volume_multiplier: f64,
    pub fdv_multiplier: f64,
    pub whale_single_buy_usd: f64,
    pub whale_liquidity_ratio: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_liq_usd: 5_000.0,
            buy_vol_1m_usd: 15_000.0,
            buy_txs_1m: 8,
            volume_multiplier: 5.0,
            fdv_multiplier: 3.0,
            whale_single_buy_usd: 5_000.0,
            whale_liquidity_ratio: 0.03,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_documented_thresholds() {
        let config = AlertConfig::default();
        assert_eq!(config.buy_vol_1m_usd, 15_000.0);
        assert_eq!(config.whale_liquidity_ratio, 0.03);
    }
}
