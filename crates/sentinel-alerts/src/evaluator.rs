//! Combines window, FDV, and whale signals into a graded verdict and
//! dispatches to a `Notifier` (§4.7).

use crate::config::AlertConfig;
use crate::notifier::{NotifyRecord, Notifier};
use crate::signal::{classify, AlertSignal, DerivedSignals, Verdict};
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use sentinel_core::{MarketKey, MarketType};
use sentinel_windows::{FdvTracker, WindowStore};
use std::sync::Arc;

/// FDV samples are compared against a sample taken at least this long
/// ago, never a stale one outside the tracker's own retention window.
const FDV_MIN_AGE: chrono::Duration = chrono::Duration::minutes(3);

/// Per-trade-event input the subscriber assembles and hands to the
/// evaluator (§4.7's documented input set, plus the identity fields
/// the notifier record needs).
#[derive(Debug, Clone, Copy)]
pub struct AlertInput {
    pub key: MarketKey,
    pub market_type: MarketType,
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub target_is_token0: bool,
    pub last_trade_usd: f64,
    pub is_buy: bool,
    pub last_mint_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    /// Current FDV in USD, computed upstream from totalSupply/decimals
    /// and an AMM-or-aggregator price; `None` if it couldn't be derived.
    pub fdv_usd: Option<f64>,
}

/// Evaluates trade events against sliding-window and FDV-burst signals
/// and dispatches actionable verdicts to a notifier.
pub struct AlertEvaluator {
    windows: Arc<WindowStore>,
    fdv: Arc<FdvTracker>,
    config: AlertConfig,
    notifier: Arc<dyn Notifier>,
}

impl AlertEvaluator {
    pub fn new(
        windows: Arc<WindowStore>,
        fdv: Arc<FdvTracker>,
        config: AlertConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            windows,
            fdv,
            config,
            notifier,
        }
    }

    pub fn evaluate(&self, input: AlertInput, now: DateTime<Utc>) -> AlertSignal {
        let stats = self.windows.one_minute(&input.key, now);
        let (buy_usd_1m, buy_txs_1m) = stats
            .map(|s| (s.buy_usd.value(), s.buy_txs))
            .unwrap_or((0.0, 0));
        let total_usd_1m = stats.map(|s| s.total_usd.value()).unwrap_or(0.0);

        let buy_meets_volume =
            buy_usd_1m >= self.config.buy_vol_1m_usd && buy_txs_1m >= self.config.buy_txs_1m;

        let baseline = self
            .windows
            .baseline_avg_per_min(&input.key, now)
            .map(|u| u.value())
            .unwrap_or(0.0);
        let volume_ratio = if baseline > 0.0 {
            total_usd_1m / baseline
        } else if total_usd_1m > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        let volume_burst = volume_ratio >= self.config.volume_multiplier;

        let fdv_ratio = input.fdv_usd.and_then(|fdv| {
            let fdv = sentinel_core::Usd::new(fdv);
            self.fdv.push(input.key, fdv, now);
            self.fdv.ratio_since(&input.key, fdv, FDV_MIN_AGE, now)
        });
        let fdv_burst = fdv_ratio
            .map(|r| r >= self.config.fdv_multiplier)
            .unwrap_or(false);

        let whale_by_liquidity = input
            .liquidity_usd
            .map(|liq| liq > 0.0 && input.last_trade_usd / liq >= self.config.whale_liquidity_ratio)
            .unwrap_or(false);
        let whale = input.is_buy
            && (whale_by_liquidity || input.last_trade_usd >= self.config.whale_single_buy_usd);

        let mint_bonus = input
            .last_mint_usd
            .map(|mint| mint >= 1.2 * self.config.min_liq_usd)
            .unwrap_or(false);

        let mut score = 0u32;
        if input.is_buy {
            score += 2;
        }
        if volume_burst {
            score += 2;
        }
        if fdv_burst {
            score += 2;
        }
        if whale {
            score += 3;
        }
        if mint_bonus {
            score += 1;
        }

        let verdict = classify(score, whale, volume_burst, fdv_burst);

        let signals = DerivedSignals {
            buy_meets_volume,
            volume_burst,
            fdv_burst,
            whale,
            mint_bonus,
            volume_ratio,
            fdv_ratio,
        };

        let (headline, body) = render_message(&input, score, verdict, &signals);

        let result = AlertSignal {
            market_key: input.key,
            score,
            verdict,
            signals,
            headline: headline.clone(),
            body: body.clone(),
            detected_at: now,
        };

        if verdict.is_actionable() {
            self.notifier.notify(&NotifyRecord {
                level: verdict,
                chain: input.key.chain,
                market_type: input.market_type,
                address: input.address,
                token0: input.token0,
                token1: input.token1,
                target_is_token0: input.target_is_token0,
                headline,
                body,
            });
        }

        result
    }
}

fn render_message(
    input: &AlertInput,
    score: u32,
    verdict: Verdict,
    signals: &DerivedSignals,
) -> (String, String) {
    let headline = format!(
        "{} {} {} score={}",
        input.key.chain, input.key.market_type, verdict, score
    );

    let mut factors = Vec::new();
    if signals.buy_meets_volume {
        factors.push("buyMeetsVolume".to_string());
    }
    if signals.volume_burst {
        factors.push(format!("volumeBurst(x{:.1})", signals.volume_ratio));
    }
    if signals.fdv_burst {
        if let Some(ratio) = signals.fdv_ratio {
            factors.push(format!("fdvBurst(x{ratio:.1})"));
        }
    }
    if signals.whale {
        let detail = match input.liquidity_usd {
            Some(liq) if liq > 0.0 => format!(
                "whale({:.1}% of liquidity)",
                100.0 * input.last_trade_usd / liq
            ),
            _ => format!("whale(${:.0})", input.last_trade_usd),
        };
        factors.push(detail);
    }
    if signals.mint_bonus {
        factors.push("mintBonus".to_string());
    }

    let body = format!(
        "last_trade_usd={:.2} is_buy={} factors=[{}]",
        input.last_trade_usd,
        input.is_buy,
        factors.join(", ")
    );

    (headline, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{Chain, Usd};

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    fn key() -> MarketKey {
        MarketKey::new(Chain::Bsc, MarketType::V2, addr(0xAA))
    }

    fn base_input() -> AlertInput {
        AlertInput {
            key: key(),
            market_type: MarketType::V2,
            address: addr(0xAA),
            token0: addr(1),
            token1: addr(2),
            target_is_token0: true,
            last_trade_usd: 100.0,
            is_buy: true,
            last_mint_usd: None,
            liquidity_usd: Some(100_000.0),
            fdv_usd: None,
        }
    }

    struct RecordingNotifier(std::sync::Mutex<Vec<NotifyRecord>>);

    impl Notifier for RecordingNotifier {
        fn notify(&self, record: &NotifyRecord) {
            self.0.lock().unwrap().push(record.clone());
        }
    }

    fn evaluator() -> (Arc<WindowStore>, Arc<FdvTracker>, Arc<RecordingNotifier>, AlertEvaluator) {
        let windows = Arc::new(WindowStore::new());
        let fdv = Arc::new(FdvTracker::new());
        let notifier = Arc::new(RecordingNotifier(std::sync::Mutex::new(Vec::new())));
        let evaluator = AlertEvaluator::new(
            windows.clone(),
            fdv.clone(),
            AlertConfig::default(),
            notifier.clone(),
        );
        (windows, fdv, notifier, evaluator)
    }

    #[test]
    fn test_whale_buy_triggers_notify() {
        let (_windows, _fdv, notifier, eval) = evaluator();
        let now = Utc::now();
        let mut input = base_input();
        input.last_trade_usd = 4_000.0;
        input.liquidity_usd = Some(100_000.0);

        let signal = eval.evaluate(input, now);
        assert!(signal.signals.whale);
        assert!(signal.score >= 5);
        assert_eq!(notifier.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_small_buy_with_no_bursts_is_none() {
        let (_windows, _fdv, notifier, eval) = evaluator();
        let now = Utc::now();
        let input = base_input();

        let signal = eval.evaluate(input, now);
        assert_eq!(signal.verdict, Verdict::None);
        assert!(notifier.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fdv_burst_requires_prior_sample_past_min_age() {
        let (_windows, fdv, _notifier, eval) = evaluator();
        let t0 = Utc::now();
        fdv.push(key(), 1_000_000.0, t0);

        let mut input = base_input();
        input.is_buy = false;
        input.fdv_usd = Some(4_000_000.0);

        let t1 = t0 + chrono::Duration::minutes(4);
        let signal = eval.evaluate(input, t1);
        assert!(signal.signals.fdv_burst);
        assert_eq!(signal.signals.fdv_ratio, Some(4.0));
    }

    #[test]
    fn test_volume_burst_uses_window_baseline() {
        let (windows, _fdv, _notifier, eval) = evaluator();
        let t0 = Utc::now();
        for i in 0..10 {
            windows.record(
                key(),
                sentinel_core::TradeEvent::new(
                    t0 - chrono::Duration::seconds(500 - i * 10),
                    Usd::new(50.0),
                    true,
                    Some(addr(2)),
                ),
            );
        }
        for i in 0..10 {
            windows.record(
                key(),
                sentinel_core::TradeEvent::new(
                    t0 - chrono::Duration::seconds(30 - i * 2),
                    Usd::new(2_000.0),
                    true,
                    Some(addr(3)),
                ),
            );
        }

        let mut input = base_input();
        input.last_trade_usd = 2_000.0;
        input.liquidity_usd = None;

        let signal = eval.evaluate(input, t0);
        assert!(signal.signals.volume_burst);
    }
}
