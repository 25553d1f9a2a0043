//! Reserve/slot0 pricing formulas and the base-token USD oracle.

pub mod decimals;
pub mod oracle;
pub mod reserves;

pub use decimals::DecimalsCache;
pub use oracle::PriceOracle;
pub use reserves::{
    derive_counterpart_usd, preferred_base, v2_price_token0_in_token1, v2_price_token1_in_token0,
    v3_price_token0_per_token1, v3_price_token1_per_token0,
};
