//! Verdict and derived-signal types produced by `AlertEvaluator`.

use chrono::{DateTime, Utc};
use sentinel_core::MarketKey;

/// Graded outcome of evaluating one trade event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    None,
    Normal,
    Strong,
}

impl Verdict {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Verdict::None)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::None => "none",
            Verdict::Normal => "normal",
            Verdict::Strong => "strong",
        };
        write!(f, "{s}")
    }
}

/// The derived booleans behind a verdict, kept around for the
/// human-readable message and for tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedSignals {
    pub buy_meets_volume: bool,
    pub volume_burst: bool,
    pub fdv_burst: bool,
    pub whale: bool,
    pub mint_bonus: bool,
    pub volume_ratio: f64,
    pub fdv_ratio: Option<f64>,
}

/// Result of one `AlertEvaluator::evaluate` call.
#[derive(Debug, Clone)]
pub struct AlertSignal {
    pub market_key: MarketKey,
    pub score: u32,
    pub verdict: Verdict,
    pub signals: DerivedSignals,
    pub headline: String,
    pub body: String,
    pub detected_at: DateTime<Utc>,
}

/// Classifies a score + the two verdict-gating booleans into a
/// `Verdict`, per the documented scoring table.
pub fn classify(score: u32, whale: bool, volume_burst: bool, fdv_burst: bool) -> Verdict {
    if score >= 6 && (whale || (volume_burst && fdv_burst)) {
        Verdict::Strong
    } else if score >= 3 {
        Verdict::Normal
    } else {
        Verdict::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_strong_requires_whale_or_burst_pair() {
        assert_eq!(classify(6, true, false, false), Verdict::Strong);
        assert_eq!(classify(6, false, true, true), Verdict::Strong);
        assert_eq!(classify(6, false, true, false), Verdict::Normal);
    }

    #[test]
    fn test_classify_normal_threshold() {
        assert_eq!(classify(3, false, false, false), Verdict::Normal);
        assert_eq!(classify(2, false, false, false), Verdict::None);
    }
}
