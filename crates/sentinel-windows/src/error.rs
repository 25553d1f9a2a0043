//! Window-store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowsError {
    #[error("unknown market: {0}")]
    UnknownMarket(String),
}

pub type WindowsResult<T> = Result<T, WindowsError>;
