//! Error types for sentinel-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid USD amount: {0}")]
    InvalidUsd(String),

    #[error("Invalid market key: {0}")]
    InvalidMarketKey(String),

    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Unrecognized base token for chain {chain}: {address}")]
    UnknownBaseToken { chain: String, address: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
