//! Sliding trade windows, FDV history, and tax-sample estimation.
//!
//! Per-market state is sharded the same way as the rest of the
//! sentinel: a `DashMap` keyed by `MarketKey` with per-entry locking,
//! so a busy market never blocks aggregate queries on another.

pub mod error;
pub mod fdv;
pub mod store;
pub mod tax;

pub use error::{WindowsError, WindowsResult};
pub use fdv::FdvTracker;
pub use store::{OneMinuteStats, WindowStore};
pub use tax::{TaxEstimator, TaxSide};
