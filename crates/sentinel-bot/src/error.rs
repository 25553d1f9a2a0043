//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Aggregator error: {0}")]
    Aggregator(#[from] sentinel_aggregator::AggregatorError),

    #[error("Chain error: {0}")]
    Chain(#[from] sentinel_chain::ChainError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] sentinel_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
