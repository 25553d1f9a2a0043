//! Watchlist error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("market not found: {0}")]
    NotFound(String),
}

pub type WatchlistResult<T> = Result<T, WatchlistError>;
