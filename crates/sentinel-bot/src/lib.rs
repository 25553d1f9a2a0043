//! Real-time anomaly detector for decentralized spot-market trading
//! activity across BSC and Ethereum.
//!
//! Wires market discovery, gating, pricing, and alert evaluation into
//! a single long-running process.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
