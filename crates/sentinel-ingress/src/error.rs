//! Ingress error types.
//!
//! Per §7's propagation policy, poller and subscription failures are
//! localized and logged rather than surfaced here; this enum exists
//! for the handful of construction-time failures that do need to stop
//! the caller (e.g. an unconfigured chain).

use thiserror::Error;
use sentinel_core::Chain;

#[derive(Debug, Error)]
pub enum IngressError {
    #[error("no chain client configured for {0}")]
    NoChainClient(Chain),
}

pub type IngressResult<T> = Result<T, IngressError>;
