//! Chain-client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC call failed: {0}")]
    RpcFailed(String),

    #[error("subscription dropped: {0}")]
    SubscriptionDropped(String),

    #[error("no bytecode at {0}")]
    NoBytecode(String),

    #[error("unexpected response shape calling {method}: {detail}")]
    MalformedResponse { method: String, detail: String },

    #[error("max reconnection attempts reached")]
    MaxRetriesExceeded,

    #[error("rate limit exceeded for {0}")]
    RateLimitExceeded(String),
}

pub type ChainResult<T> = Result<T, ChainError>;
