//! Chain-client trait and `alloy`-backed EVM access.
//!
//! Provides:
//! - `ChainClient`: the trait every other crate depends on instead of
//!   touching `alloy` directly
//! - `AlloyChainClient`: the real implementation, backed by a
//!   websocket provider, with call retries and RPC throttling
//! - EVM log/event decoding for the V2/V3 factory and swap/mint events
//!   this system watches

pub mod backoff;
pub mod client;
pub mod error;
pub mod events;
pub mod rate_limiter;
pub mod rpc;

pub use backoff::{retry_with_backoff, BackoffConfig};
pub use client::{ChainClient, FactoryCandidate, MarketEvent, SwapQuote};
pub use error::{ChainError, ChainResult};
pub use events::{PoolCreatedEvent, Reserves, Slot0, V2MintEvent, V2SwapEvent, V3SwapEvent};
pub use rate_limiter::RateLimiter;
pub use rpc::{connect_ws, AlloyChainClient, DexFamilyConfig};
