//! Safety probes and the sequential gate pipeline.
//!
//! Every newly discovered candidate runs through bytecode presence,
//! minimum liquidity, sellability, LP-risk scoring, and tax-sample
//! checks before the watchlist admits it. Any failure short-circuits
//! the remaining checks and records a machine-readable rejection
//! reason.

pub mod error;
pub mod pipeline;
pub mod probes;

pub use error::{SafetyError, SafetyResult};
pub use pipeline::{ChainDexConfig, GatePipeline, GatePipelineConfig};
