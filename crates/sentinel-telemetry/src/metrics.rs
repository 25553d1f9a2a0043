//! Prometheus metrics for anomaly detection ingress and alerting.
//!
//! Provides observability from Day 1 for:
//! - Candidate discovery (factory events, trending poll)
//! - Gate-pipeline rejections
//! - Active market/subscription-slot pressure
//! - Alert verdicts
//! - Trending-poller health
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, register_int_gauge,
    CounterVec, GaugeVec, HistogramVec, IntGauge,
};

/// Total candidates surfaced per discovery source and chain.
/// Labels: source (factory/trending), chain (bsc/eth)
pub static INGRESS_CANDIDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ingress_candidates_total",
        "Total candidate markets surfaced by discovery source",
        &["source", "chain"]
    )
    .unwrap()
});

/// Total gate-pipeline rejections by reason.
pub static GATE_REJECTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gate_rejections_total",
        "Total candidates rejected by the gate pipeline",
        &["reason"]
    )
    .unwrap()
});

/// Currently active (subscribed) markets per chain.
pub static ACTIVE_MARKETS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!("active_markets", "Currently subscribed markets", &["chain"]).unwrap()
});

/// Subscription slots currently in use (process-wide budget).
pub static SUBSCRIPTION_SLOTS_USED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "subscription_slots_used",
        "Subscription slots currently in use"
    )
    .unwrap()
});

/// Total alerts emitted by verdict.
pub static ALERTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("alerts_total", "Total alerts emitted", &["verdict"]).unwrap()
});

/// Trending-poller cycle latency in milliseconds.
pub static POLLER_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "poller_latency_ms",
        "Trending poller cycle latency in milliseconds",
        &["chain"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Total trending-poller cycle failures by chain.
pub static POLLER_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "poller_failures_total",
        "Total trending poller cycles that failed and fell back to synthesis",
        &["chain"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a candidate surfaced by a discovery source.
    pub fn candidate_discovered(source: &str, chain: &str) {
        INGRESS_CANDIDATES_TOTAL
            .with_label_values(&[source, chain])
            .inc();
    }

    /// Record a gate-pipeline rejection.
    pub fn gate_rejected(reason: &str) {
        GATE_REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Set the active-market gauge for a chain.
    pub fn active_markets_set(chain: &str, count: f64) {
        ACTIVE_MARKETS.with_label_values(&[chain]).set(count);
    }

    /// Set the subscription-slots-used gauge.
    pub fn subscription_slots_used_set(count: i64) {
        SUBSCRIPTION_SLOTS_USED.set(count);
    }

    /// Record an alert emitted with a given verdict.
    pub fn alert_emitted(verdict: &str) {
        ALERTS_TOTAL.with_label_values(&[verdict]).inc();
    }

    /// Record a trending-poller cycle's latency.
    pub fn poller_latency(chain: &str, latency_ms: f64) {
        POLLER_LATENCY_MS
            .with_label_values(&[chain])
            .observe(latency_ms);
    }

    /// Record a trending-poller cycle failure.
    pub fn poller_failure(chain: &str) {
        POLLER_FAILURES_TOTAL.with_label_values(&[chain]).inc();
    }
}
