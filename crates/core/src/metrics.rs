//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Batches (items by result, batch duration)
//! - External tool invocations
//! - Archive flattening

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batches total by domain and outcome.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fileforge_batches_total", "Total conversion batches"),
        &["domain", "result"], // "completed", "partial", "rejected"
    )
    .unwrap()
});

/// Batch items total by domain and terminal status.
pub static ITEMS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fileforge_items_total", "Total batch items processed"),
        &["domain", "status"], // "done", "error", "cancelled"
    )
    .unwrap()
});

/// Batch duration in seconds.
pub static BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fileforge_batch_duration_seconds",
            "Duration of conversion batches",
        )
        .buckets(vec![
            0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0,
        ]),
        &["domain"],
    )
    .unwrap()
});

// =============================================================================
// Tool Metrics
// =============================================================================

/// External tool invocations by program and result.
pub static TOOL_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fileforge_tool_invocations_total",
            "Total external tool invocations",
        ),
        &["program", "result"], // "success", "failed", "spawn_error", "timeout", "cancelled"
    )
    .unwrap()
});

/// External tool run time in seconds.
pub static TOOL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fileforge_tool_duration_seconds",
            "Duration of external tool invocations",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0]),
        &["program"],
    )
    .unwrap()
});

// =============================================================================
// Archive Metrics
// =============================================================================

/// Extraction passes performed while flattening archives.
pub static ARCHIVE_EXTRACTIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "fileforge_archive_extractions_total",
        "Total archive extraction passes",
    )
    .unwrap()
});

/// Archives that hit a nesting or extraction limit.
pub static ARCHIVE_LIMIT_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fileforge_archive_limit_hits_total",
            "Archives rejected by a flattening limit",
        ),
        &["limit"], // "depth", "extractions"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Batches
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(ITEMS_TOTAL.clone()),
        Box::new(BATCH_DURATION.clone()),
        // Tools
        Box::new(TOOL_INVOCATIONS.clone()),
        Box::new(TOOL_DURATION.clone()),
        // Archives
        Box::new(ARCHIVE_EXTRACTIONS.clone()),
        Box::new(ARCHIVE_LIMIT_HITS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register_once() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        ITEMS_TOTAL.with_label_values(&["media", "done"]).inc();
        ARCHIVE_EXTRACTIONS.inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"fileforge_items_total".to_string()));
        assert!(names.contains(&"fileforge_archive_extractions_total".to_string()));
    }
}
