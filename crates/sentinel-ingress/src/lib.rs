//! Market discovery (factory events + trending poll) and per-market
//! subscription.
//!
//! Owns the two candidate-discovery sources, the gate-then-subscribe
//! handoff shared by both, per-market event translation/pricing, and
//! the process-wide subscription slot budget.

pub mod admit;
pub mod dedup;
pub mod error;
pub mod factory;
pub mod ingress;
pub mod pricer;
pub mod slots;
pub mod subscriber;
pub mod translate;
pub mod trending;

pub use admit::AdmitDeps;
pub use error::{IngressError, IngressResult};
pub use ingress::Ingress;
pub use slots::{SlotBudget, StopHandle};
pub use subscriber::SubscriberDeps;
pub use trending::TrendingPollerConfig;
