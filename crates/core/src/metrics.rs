//! Prometheus metrics for the sweep core.
//!
//! Counters are labeled by application type. Per-instance labels are
//! deliberately avoided, instance names are free-form configuration text.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

/// Sweep cycles started.
pub static SWEEP_CYCLES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("reaparr_sweep_cycles_total", "Total sweep cycles started").unwrap()
});

/// Queue items evaluated by app.
pub static ITEMS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reaparr_items_processed_total",
            "Total queue items evaluated",
        ),
        &["app"],
    )
    .unwrap()
});

/// Items exempted from striking by app.
pub static ITEMS_IGNORED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reaparr_items_ignored_total",
            "Total queue items ignored by size, delay or grace window",
        ),
        &["app"],
    )
    .unwrap()
});

/// Strikes added by app.
pub static STRIKES_ADDED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reaparr_strikes_added_total", "Total strikes added"),
        &["app"],
    )
    .unwrap()
});

/// Downloads removed from queues by app.
pub static DOWNLOADS_REMOVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reaparr_downloads_removed_total",
            "Total downloads removed from queues",
        ),
        &["app"],
    )
    .unwrap()
});

/// Queue fetch failures by app.
pub static QUEUE_FETCH_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reaparr_queue_fetch_errors_total",
            "Total queue fetch failures",
        ),
        &["app"],
    )
    .unwrap()
});

/// Queue delete failures by app.
pub static DELETE_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reaparr_delete_errors_total",
            "Total queue delete failures",
        ),
        &["app"],
    )
    .unwrap()
});

/// Queue sizes observed per fetch.
pub static QUEUE_ITEMS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reaparr_queue_items",
            "Number of queue items returned per fetch",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
        &["app"],
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SWEEP_CYCLES.clone()),
        Box::new(ITEMS_PROCESSED.clone()),
        Box::new(ITEMS_IGNORED.clone()),
        Box::new(STRIKES_ADDED.clone()),
        Box::new(DOWNLOADS_REMOVED.clone()),
        Box::new(QUEUE_FETCH_ERRORS.clone()),
        Box::new(DELETE_ERRORS.clone()),
        Box::new(QUEUE_ITEMS.clone()),
    ]
}
