//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    COLLECTION_CYCLES_TOTAL, COLLECTION_DURATION_MS, CONNECTIONS_PRUNED_TOTAL,
    PARSE_FAILURES_TOTAL, PROBE_FAILURES_TOTAL, REPORT_ITEMS_TOTAL,
};
use crate::stats::CollectionReport;

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording collection cycle metrics
pub struct CollectorMetrics;

impl CollectorMetrics {
    /// Record the outcome of one collection cycle
    pub fn record_cycle<T>(report: &CollectionReport<T>) {
        COLLECTION_CYCLES_TOTAL.inc();
        COLLECTION_DURATION_MS.observe(report.elapsed_ms as f64);
        REPORT_ITEMS_TOTAL.inc_by(report.items.len() as u64);
        CONNECTIONS_PRUNED_TOTAL.inc_by(report.pruned.len() as u64);
        PARSE_FAILURES_TOTAL.inc_by(report.failed as u64);
    }

    /// Record a failed closed-state check
    pub fn record_probe_failure() {
        PROBE_FAILURES_TOTAL.inc();
    }
}
