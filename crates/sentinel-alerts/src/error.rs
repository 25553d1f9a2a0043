//! Alert evaluator error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("configuration error: {0}")]
    Config(String),
}

pub type AlertResult<T> = Result<T, AlertError>;
