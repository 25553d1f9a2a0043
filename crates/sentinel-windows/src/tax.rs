//! Rolling buy/sell tax sample estimator (C7).
//!
//! A "tax" sample is the fractional shortfall between a swap's
//! realized output and the output its pool's mid-price would predict.
//! Only ever fed decimal-normalized (post `/10^decimals`) amounts —
//! there is no raw-integer variant.

use dashmap::DashMap;
use parking_lot::RwLock;
use sentinel_core::{MarketKey, Usd};
use std::collections::VecDeque;

const RETENTION_SAMPLES: usize = 200;
const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxSide {
    Buy,
    Sell,
}

#[derive(Default)]
struct Series {
    buy: VecDeque<f64>,
    sell: VecDeque<f64>,
}

impl Series {
    fn push(&mut self, side: TaxSide, sample: f64) {
        let series = match side {
            TaxSide::Buy => &mut self.buy,
            TaxSide::Sell => &mut self.sell,
        };
        series.push_back(sample);
        if series.len() > RETENTION_SAMPLES {
            series.pop_front();
        }
    }

    fn avg(&self, side: TaxSide) -> Option<f64> {
        let series = match side {
            TaxSide::Buy => &self.buy,
            TaxSide::Sell => &self.sell,
        };
        if series.is_empty() {
            return None;
        }
        Some(series.iter().sum::<f64>() / series.len() as f64)
    }
}

/// Computes a single tax sample: `clamp(0, 1, 1 - observed / max(expected, eps))`.
pub fn compute_sample(expected: f64, observed: f64) -> f64 {
    let ratio = observed / expected.max(EPSILON);
    Usd::new(1.0 - ratio).clamp(0.0, 1.0).value()
}

/// Rolling per-market buy/sell tax estimator. Retains the last
/// [`RETENTION_SAMPLES`] samples per side per market (the window is
/// sample-count bounded rather than time bounded, matching how few
/// taxed swaps typically occur within any fixed time horizon).
pub struct TaxEstimator {
    series: DashMap<MarketKey, RwLock<Series>>,
}

impl TaxEstimator {
    pub fn new() -> Self {
        Self {
            series: DashMap::new(),
        }
    }

    pub fn record(&self, key: MarketKey, side: TaxSide, expected: f64, observed: f64) {
        let sample = compute_sample(expected, observed);
        let entry = self.series.entry(key).or_insert_with(|| RwLock::new(Series::default()));
        entry.write().push(side, sample);
    }

    /// Arithmetic mean tax for `side` on `key`. `None` if no samples
    /// have been recorded yet — the gate pipeline must never block on
    /// first sight.
    pub fn get_avg(&self, key: &MarketKey, side: TaxSide) -> Option<f64> {
        let entry = self.series.get(key)?;
        entry.read().avg(side)
    }
}

impl Default for TaxEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use sentinel_core::{Chain, MarketType};

    fn key() -> MarketKey {
        MarketKey::new(Chain::Bsc, MarketType::V2, Address::from([8u8; 20]))
    }

    #[test]
    fn test_compute_sample_zero_tax() {
        assert_eq!(compute_sample(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_compute_sample_ten_percent_tax() {
        let sample = compute_sample(100.0, 90.0);
        assert!((sample - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_compute_sample_clamped_when_observed_exceeds_expected() {
        // Negative "tax" (observed > expected) clamps to 0, not negative.
        assert_eq!(compute_sample(100.0, 110.0), 0.0);
    }

    #[test]
    fn test_get_avg_none_before_first_sample() {
        let estimator = TaxEstimator::new();
        assert!(estimator.get_avg(&key(), TaxSide::Buy).is_none());
    }

    #[test]
    fn test_get_avg_is_arithmetic_mean() {
        let estimator = TaxEstimator::new();
        let k = key();
        estimator.record(k, TaxSide::Sell, 100.0, 90.0); // 0.1
        estimator.record(k, TaxSide::Sell, 100.0, 80.0); // 0.2

        let avg = estimator.get_avg(&k, TaxSide::Sell).unwrap();
        assert!((avg - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_buy_and_sell_series_are_independent() {
        let estimator = TaxEstimator::new();
        let k = key();
        estimator.record(k, TaxSide::Buy, 100.0, 95.0);
        assert!(estimator.get_avg(&k, TaxSide::Sell).is_none());
    }
}
