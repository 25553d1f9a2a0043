//! Market lifecycle and trade-event data types.
//!
//! Contains the `Market` metadata record tracked by the watchlist, its
//! `MarketStatus`/`RejectReason`, and `TradeEvent`, the unit of flow
//! recorded by per-market window stores.

use crate::decimal::Usd;
use crate::market::MarketKey;
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a watchlist entry.
///
/// Monotone admission: a market transitions `pending -> active` or
/// `pending -> rejected` exactly once; both `active` and `rejected`
/// are terminal for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Pending,
    Active,
    Rejected,
}

impl MarketStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MarketStatus::Pending)
    }
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketStatus::Pending => write!(f, "pending"),
            MarketStatus::Active => write!(f, "active"),
            MarketStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Machine-readable reason a candidate was rejected by the gate
/// pipeline. Recorded on the watchlist entry alongside the terminal
/// `Rejected` status and reported in the hourly summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No bytecode at the pool address (not yet mined / self-destructed).
    NoBytecode,
    /// Reported or computed liquidity below the minimum threshold.
    MinLiquidity,
    /// No router/quoter path returned a positive quote.
    Unsellable,
    /// LP-risk score reached the reject threshold.
    LpRisk,
    /// Neither candidate source attached a recognized base token and
    /// admission requires one.
    NoBaseToken,
    /// Average recorded buy/sell tax sample exceeded the configured cap.
    TaxTooHigh,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::NoBytecode => "no_bytecode",
            RejectReason::MinLiquidity => "min_liquidity",
            RejectReason::Unsellable => "unsellable",
            RejectReason::LpRisk => "lp_risk",
            RejectReason::NoBaseToken => "no_base_token",
            RejectReason::TaxTooHigh => "tax_too_high",
        };
        write!(f, "{s}")
    }
}

/// A single trade (swap) observed on a market, normalized into a
/// directional USD flow. Appended monotonically to a market's window
/// store in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub timestamp: DateTime<Utc>,
    pub usd_value: Usd,
    pub is_buy: bool,
    pub buyer: Option<Address>,
}

impl TradeEvent {
    pub fn new(timestamp: DateTime<Utc>, usd_value: Usd, is_buy: bool, buyer: Option<Address>) -> Self {
        Self {
            timestamp,
            usd_value,
            is_buy,
            buyer,
        }
    }
}

/// Metadata bag carried by a watchlist entry in addition to its
/// lifecycle status: the last-observed values needed by the gate
/// pipeline and alert evaluator without re-querying the chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketMetadata {
    pub liquidity_usd: Option<Usd>,
    pub last_mint_usd: Option<Usd>,
    pub has_base_token: bool,
}

impl Default for MarketMetadata {
    fn default() -> Self {
        Self {
            liquidity_usd: None,
            last_mint_usd: None,
            has_base_token: false,
        }
    }
}

/// A market tracked by the watchlist: identity, token pair, lifecycle
/// status, and metadata. Exclusively owned by the watchlist; every
/// other component only holds a `MarketKey` lookup reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub key: MarketKey,
    pub token0: Address,
    pub token1: Address,
    /// V3 fee tier in hundredths of a basis point (e.g. 3000 = 0.3%).
    pub fee: Option<u32>,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub status: MarketStatus,
    pub reason: Option<RejectReason>,
    pub metadata: MarketMetadata,
}

impl Market {
    pub fn new_pending(
        key: MarketKey,
        token0: Address,
        token1: Address,
        fee: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            token0,
            token1,
            fee,
            first_seen: now,
            last_updated: now,
            status: MarketStatus::Pending,
            reason: None,
            metadata: MarketMetadata::default(),
        }
    }

    /// Transition `pending -> active`. No-op (returns `false`) if the
    /// entry is already terminal.
    pub fn admit(&mut self, liquidity_usd: Usd, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = MarketStatus::Active;
        self.metadata.liquidity_usd = Some(liquidity_usd);
        self.last_updated = now;
        true
    }

    /// Transition `pending -> rejected`. No-op (returns `false`) if the
    /// entry is already terminal.
    pub fn reject(&mut self, reason: RejectReason, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = MarketStatus::Rejected;
        self.reason = Some(reason);
        self.last_updated = now;
        true
    }

    pub fn is_active(&self) -> bool {
        self.status == MarketStatus::Active
    }

    /// Idle age, used by the reaper sweep (24h active / 1h non-active).
    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Chain, MarketType};

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn sample_key() -> MarketKey {
        MarketKey::new(Chain::Bsc, MarketType::V2, addr(0xAA))
    }

    #[test]
    fn test_admit_transitions_pending_to_active() {
        let now = Utc::now();
        let mut m = Market::new_pending(sample_key(), addr(1), addr(2), None, now);
        assert!(m.admit(Usd::new(12_000.0), now));
        assert_eq!(m.status, MarketStatus::Active);
        assert_eq!(m.metadata.liquidity_usd, Some(Usd::new(12_000.0)));
    }

    #[test]
    fn test_terminal_status_is_monotone() {
        let now = Utc::now();
        let mut m = Market::new_pending(sample_key(), addr(1), addr(2), None, now);
        assert!(m.reject(RejectReason::MinLiquidity, now));
        assert_eq!(m.status, MarketStatus::Rejected);
        // Further transitions are no-ops once terminal.
        assert!(!m.admit(Usd::new(1.0), now));
        assert_eq!(m.status, MarketStatus::Rejected);
    }

    #[test]
    fn test_trade_event_construction() {
        let ev = TradeEvent::new(Utc::now(), Usd::new(500.0), true, Some(addr(9)));
        assert!(ev.is_buy);
        assert_eq!(ev.usd_value.value(), 500.0);
    }
}
