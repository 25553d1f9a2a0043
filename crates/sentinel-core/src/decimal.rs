//! USD-denominated floating point types for statistics.
//!
//! On-chain token amounts are arbitrary-precision integers (see
//! [`crate::chain`] for `alloy` primitives used while they are still raw).
//! Once an amount has been divided by `10^decimals` it becomes a plain
//! double and is wrapped here so it can't be mixed up with a raw token
//! count or an unrelated ratio.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// A USD-denominated quantity derived from a decimals-normalized token
/// amount (price, notional, liquidity, FDV, ...).
///
/// Never constructed directly from a raw on-chain integer; always go
/// through decimals normalization first.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usd(pub f64);

impl Usd {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    /// `self` as a multiple of `other`, or `None` if `other` is zero or
    /// either side is non-finite.
    #[inline]
    pub fn ratio_to(&self, other: Usd) -> Option<f64> {
        if other.0 == 0.0 || !self.0.is_finite() || !other.0.is_finite() {
            return None;
        }
        Some(self.0 / other.0)
    }

    /// Basis-point difference of `self` relative to `other`.
    #[inline]
    pub fn bps_from(&self, other: Usd) -> Option<f64> {
        self.ratio_to(other).map(|r| (r - 1.0) * 10_000.0)
    }

    #[inline]
    pub fn clamp(&self, min: f64, max: f64) -> Self {
        Self(self.0.clamp(min, max))
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<f64> for Usd {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

impl Add for Usd {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Usd {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Usd {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Usd {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Converts a raw on-chain token amount (as a decimal string from
/// `alloy::primitives::U256::to_string()` or similar) into a plain
/// double, dividing by `10^decimals`. Returns `None` if the string
/// isn't a valid non-negative integer literal.
pub fn normalize_amount(raw: &str, decimals: u8) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    Some(value / 10f64.powi(decimals as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_from() {
        let p1 = Usd::new(100.0);
        let p2 = Usd::new(101.0);

        let bps = p2.bps_from(p1).unwrap();
        assert!((bps - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bps_from_zero_base() {
        assert!(Usd::new(5.0).bps_from(Usd::ZERO).is_none());
    }

    #[test]
    fn test_normalize_amount() {
        let got = normalize_amount("1500000000000000000", 18).unwrap();
        assert!((got - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_amount_rejects_non_numeric() {
        assert!(normalize_amount("0x1234", 18).is_none());
        assert!(normalize_amount("-5", 18).is_none());
    }

    #[test]
    fn test_clamp() {
        let tax = Usd::new(1.4).clamp(0.0, 1.0);
        assert_eq!(tax.value(), 1.0);
    }
}
