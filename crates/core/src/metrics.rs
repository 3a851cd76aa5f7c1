//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Rendering (tickets rendered, render duration)
//! - Batches (runs, duration, waves, archive size)
//! - Progress store (sweep evictions)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Rendering
// =============================================================================

/// Tickets rendered inside batches, by result.
pub static TICKETS_RENDERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketpress_tickets_rendered_total",
            "Total tickets rendered in batches",
        ),
        &["result"], // "success", "failed", "timeout"
    )
    .unwrap()
});

/// Duration of a successful render in seconds.
pub static RENDER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketpress_render_duration_seconds",
            "Duration of a single ticket render",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["format"],
    )
    .unwrap()
});

// =============================================================================
// Batches
// =============================================================================

/// Batch runs by result.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketpress_batches_total", "Total batch runs"),
        &["result"], // "completed", "validation", "template_missing", "archive", "cancelled", "internal"
    )
    .unwrap()
});

/// Duration of completed batches in seconds.
pub static BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketpress_batch_duration_seconds",
            "Duration of completed batch runs",
        )
        .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &[],
    )
    .unwrap()
});

/// Waves finished across all batches.
pub static WAVES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("ticketpress_waves_total", "Total batch waves finished").unwrap()
});

/// Size of finalized archives in bytes.
pub static ARCHIVE_SIZE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketpress_archive_size_bytes",
            "Size of finalized batch archives",
        )
        .buckets(prometheus::exponential_buckets(64.0 * 1024.0, 4.0, 8).unwrap()),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Progress
// =============================================================================

/// Progress sessions evicted by sweeps, by rule.
pub static PROGRESS_EVICTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketpress_progress_evictions_total",
            "Progress sessions evicted by TTL sweeps",
        ),
        &["rule"], // "completed", "abandoned"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Rendering
        Box::new(TICKETS_RENDERED.clone()),
        Box::new(RENDER_DURATION.clone()),
        // Batches
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(BATCH_DURATION.clone()),
        Box::new(WAVES_TOTAL.clone()),
        Box::new(ARCHIVE_SIZE.clone()),
        // Progress
        Box::new(PROGRESS_EVICTIONS.clone()),
    ]
}
