//! Core domain types for the DEX anomaly sentinel.
//!
//! This crate provides the fundamental types shared by every other
//! crate in the workspace:
//! - `MarketKey`, `Chain`, `MarketType`: market identity
//! - `BaseToken`, `BaseTokenTable`: the closed set of recognized quote tokens
//! - `Usd`: decimals-normalized USD quantities
//! - `Market`, `MarketStatus`, `RejectReason`, `TradeEvent`: watchlist domain types

pub mod decimal;
pub mod error;
pub mod market;
pub mod types;

pub use decimal::{normalize_amount, Usd};
pub use error::{CoreError, Result};
pub use market::{BaseToken, BaseTokenEntry, BaseTokenTable, Chain, MarketKey, MarketType};
pub use types::{Market, MarketMetadata, MarketStatus, RejectReason, TradeEvent};
