//! Aggregator HTTP client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("unexpected response shape from {endpoint}: {detail}")]
    MalformedResponse { endpoint: String, detail: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AggregatorResult<T> = Result<T, AggregatorError>;
