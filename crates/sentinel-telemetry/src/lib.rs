//! Prometheus metrics and structured logging for market-anomaly ingress.
//!
//! Provides observability from Day 1:
//! - Prometheus metrics for candidate discovery, gate rejections, alerts
//! - Structured JSON logging with tracing
//! - Hourly rejection/poller-health summary reporting

pub mod daily_stats;
pub mod error;
pub mod logging;
pub mod metrics;

pub use daily_stats::{HourlyStatsReporter, HourlySummary};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
