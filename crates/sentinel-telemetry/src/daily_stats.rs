//! Periodic (hourly) summary reporter.
//!
//! Aggregates rejection-reason counts and trending-poller health since
//! the last report and writes them to the log, on a faster cycle than
//! a calendar day since this system's market turnover is measured in
//! minutes rather than days.

use crate::metrics::{GATE_REJECTIONS_TOTAL, POLLER_FAILURES_TOTAL};
use chrono::{DateTime, Utc};
use prometheus::core::Collector;
use std::collections::HashMap;
use tracing::info;

/// Summary of gate rejections and poller health over a reporting period.
#[derive(Debug, Clone)]
pub struct HourlySummary {
    pub period_start: DateTime<Utc>,
    pub rejections_by_reason: HashMap<String, u64>,
    pub poller_failures_by_chain: HashMap<String, u64>,
}

/// Hourly reporter. Owns no state besides the period start; metric values
/// are read live from the global Prometheus registry on each call.
pub struct HourlyStatsReporter {
    period_start: DateTime<Utc>,
}

impl HourlyStatsReporter {
    pub fn new() -> Self {
        Self {
            period_start: Utc::now(),
        }
    }

    /// Snapshot current counter totals, keyed by label.
    pub fn snapshot(&self) -> HourlySummary {
        HourlySummary {
            period_start: self.period_start,
            rejections_by_reason: Self::counter_totals_by_first_label(&GATE_REJECTIONS_TOTAL),
            poller_failures_by_chain: Self::counter_totals_by_first_label(&POLLER_FAILURES_TOTAL),
        }
    }

    fn counter_totals_by_first_label(counter: &prometheus::CounterVec) -> HashMap<String, u64> {
        let mut totals = HashMap::new();
        for mf in counter.collect() {
            for m in mf.get_metric() {
                if let Some(label) = m.get_label().first() {
                    *totals.entry(label.get_value().to_string()).or_insert(0) +=
                        m.get_counter().get_value() as u64;
                }
            }
        }
        totals
    }

    /// Log the current summary and reset the period start.
    pub fn report_and_reset(&mut self) {
        let summary = self.snapshot();
        let duration = Utc::now() - summary.period_start;

        info!("========== Hourly Summary ==========");
        info!(
            "Period: {} ({} minutes)",
            summary.period_start.format("%Y-%m-%d %H:%M:%S UTC"),
            duration.num_minutes()
        );

        if summary.rejections_by_reason.is_empty() {
            info!("  Rejections: none");
        } else {
            for (reason, count) in &summary.rejections_by_reason {
                info!("  Rejections[{}]: {}", reason, count);
            }
        }

        if summary.poller_failures_by_chain.is_empty() {
            info!("  Poller failures: none");
        } else {
            for (chain, count) in &summary.poller_failures_by_chain {
                info!("  Poller failures[{}]: {}", chain, count);
            }
        }

        info!("=====================================");
        self.period_start = Utc::now();
    }
}

impl Default for HourlyStatsReporter {
    fn default() -> Self {
        Self::new()
    }
}
