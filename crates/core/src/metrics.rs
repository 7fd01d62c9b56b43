//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ingestion runs (started, completed, duration)
//! - Routing decisions (path, selected unit)
//! - Unit invocations and failures

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Run Metrics
// =============================================================================

/// Runs started total.
pub static RUNS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("tierflow_runs_started_total", "Total ingestion runs started").unwrap()
});

/// Runs completed total by result.
pub static RUNS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tierflow_runs_completed_total",
            "Total ingestion runs that reached a terminal state",
        ),
        &["result"], // "succeeded", "failed"
    )
    .unwrap()
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tierflow_run_duration_seconds",
            "Duration of ingestion runs from notification to terminal state",
        )
        .buckets(vec![
            0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 60.0, 300.0, 1800.0, 7200.0, 21600.0,
        ]),
        &["result"],
    )
    .unwrap()
});

/// Extraction failures total.
pub static EXTRACTION_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tierflow_extraction_failures_total",
        "Total notifications that failed metadata extraction",
    )
    .unwrap()
});

// =============================================================================
// Routing Metrics
// =============================================================================

/// Routing decisions total by path and selected unit.
pub static ROUTING_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tierflow_routing_decisions_total",
            "Total routing decisions",
        ),
        &["path", "unit"], // path: "fast", "batch"
    )
    .unwrap()
});

/// Classification rejections total.
pub static CLASSIFICATION_REJECTIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tierflow_classification_rejections_total",
        "Total events rejected on the tier or format axis",
    )
    .unwrap()
});

// =============================================================================
// Unit Metrics
// =============================================================================

/// Unit invocations total by unit and result.
pub static UNIT_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tierflow_unit_invocations_total",
            "Total processing unit invocations",
        ),
        &["unit", "result"], // result: "success", "error", "timeout"
    )
    .unwrap()
});

/// Unit invocation duration in seconds.
pub static UNIT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tierflow_unit_duration_seconds",
            "Duration of processing unit invocations",
        )
        .buckets(vec![
            0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 60.0, 300.0, 1800.0, 7200.0,
        ]),
        &["unit"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Runs
        Box::new(RUNS_STARTED.clone()),
        Box::new(RUNS_COMPLETED.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(EXTRACTION_FAILURES.clone()),
        // Routing
        Box::new(ROUTING_DECISIONS.clone()),
        Box::new(CLASSIFICATION_REJECTIONS.clone()),
        // Units
        Box::new(UNIT_INVOCATIONS.clone()),
        Box::new(UNIT_DURATION.clone()),
    ]
}
