//! HTTP client for the external DEX market aggregator.
//!
//! Covers the token/pair/trending lookup endpoints, treating responses
//! as untyped JSON and extracting only the documented fields, plus the
//! graceful trending-fallback that probes top pools of base tokens
//! when the trending endpoint itself is unavailable.

pub mod client;
pub mod error;
pub mod types;

pub use client::AggregatorClient;
pub use error::{AggregatorError, AggregatorResult};
pub use types::{parse_pair, parse_pairs, AggregatorPair};
