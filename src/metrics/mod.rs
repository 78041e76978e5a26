//! Prometheus metrics for the stats aggregator.
//!
//! - Registry metrics (tracked connections)
//! - Collection cycle metrics (cycles, items, pruned connections, duration)
//! - Collaborator failure metrics (parser and closed-state probe)

mod helpers;

pub use helpers::{encode_metrics, CollectorMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "rtcstats";

lazy_static! {
    // ============================================================================
    // Registry Metrics
    // ============================================================================

    /// Number of peer connections currently tracked
    pub static ref CONNECTIONS_TRACKED: IntGauge = register_int_gauge!(
        format!("{}_connections_tracked", METRIC_PREFIX),
        "Number of peer connections currently tracked"
    ).unwrap();

    // ============================================================================
    // Collection Metrics
    // ============================================================================

    /// Completed collection cycles
    pub static ref COLLECTION_CYCLES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_collection_cycles_total", METRIC_PREFIX),
        "Total collection cycles completed"
    ).unwrap();

    /// Report items produced
    pub static ref REPORT_ITEMS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_report_items_total", METRIC_PREFIX),
        "Total report items produced"
    ).unwrap();

    /// Connections pruned because they were closed
    pub static ref CONNECTIONS_PRUNED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_connections_pruned_total", METRIC_PREFIX),
        "Total connections pruned after being detected closed"
    ).unwrap();

    /// Collection cycle duration in milliseconds
    pub static ref COLLECTION_DURATION_MS: Histogram = register_histogram!(
        format!("{}_collection_duration_ms", METRIC_PREFIX),
        "Collection cycle duration in milliseconds",
        vec![1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]
    ).unwrap();

    // ============================================================================
    // Collaborator Metrics
    // ============================================================================

    /// Stats parser failures (errors and panics)
    pub static ref PARSE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_parse_failures_total", METRIC_PREFIX),
        "Total stats parser failures"
    ).unwrap();

    /// Closed-state probe failures
    pub static ref PROBE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_probe_failures_total", METRIC_PREFIX),
        "Total closed-state probe failures"
    ).unwrap();
}
