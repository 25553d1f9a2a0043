//! Outbound alert sink (§6 "Notifier (outbound)").
//!
//! The evaluator delivers synchronously and never blocks on a slow
//! sink; a `Notifier` is expected to enqueue or log without awaiting
//! network I/O inline. Richer sinks (webhook, Telegram, ...) implement
//! this same trait outside this crate.

use crate::signal::Verdict;
use alloy::primitives::Address;
use sentinel_core::{Chain, MarketType};
use tracing::{info, warn};

/// One alert record, shaped after the documented opaque-sink tuple.
#[derive(Debug, Clone)]
pub struct NotifyRecord {
    pub level: Verdict,
    pub chain: Chain,
    pub market_type: MarketType,
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub target_is_token0: bool,
    pub headline: String,
    pub body: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, record: &NotifyRecord);
}

/// Default notifier: writes a structured `tracing` event. Sufficient
/// to run the crate standalone; production deployments wire in a
/// webhook/Telegram notifier that implements the same trait.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, record: &NotifyRecord) {
        let target = if record.target_is_token0 {
            record.token0
        } else {
            record.token1
        };
        match record.level {
            Verdict::Strong => info!(
                chain = %record.chain,
                market_type = %record.market_type,
                address = %record.address,
                target = %target,
                headline = %record.headline,
                body = %record.body,
                "strong alert"
            ),
            Verdict::Normal => info!(
                chain = %record.chain,
                market_type = %record.market_type,
                address = %record.address,
                target = %target,
                headline = %record.headline,
                body = %record.body,
                "alert"
            ),
            Verdict::None => warn!(
                chain = %record.chain,
                address = %record.address,
                "notify called with a none verdict, this should never happen"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    #[test]
    fn test_logging_notifier_does_not_panic_on_strong() {
        let notifier = LoggingNotifier;
        notifier.notify(&NotifyRecord {
            level: Verdict::Strong,
            chain: Chain::Bsc,
            market_type: MarketType::V2,
            address: addr(1),
            token0: addr(2),
            token1: addr(3),
            target_is_token0: true,
            headline: "test".into(),
            body: "test body".into(),
        });
    }
}
