//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Reaparr server:
//! - HTTP request metrics (latency, counts, in-flight)
//! - Sweeper status gauges (collected dynamically)
//!
//! Per-item sweep counters live in the core crate and are pulled into
//! the same registry at startup.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reaparr_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reaparr_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reaparr_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Sweeper Status (collected dynamically)
// =============================================================================

/// Whether sweeping is enabled (1) or disabled (0).
pub static SWEEP_ENABLED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reaparr_sweep_enabled",
        "Whether sweeping is enabled (1) or disabled (0)",
    )
    .unwrap()
});

/// Whether dry-run mode is active (1) or not (0).
pub static SWEEP_DRY_RUN: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reaparr_sweep_dry_run",
        "Whether dry-run mode is active (1) or not (0)",
    )
    .unwrap()
});

/// Configured Starr instances.
pub static INSTANCES_CONFIGURED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reaparr_instances_configured",
        "Number of configured Starr instances",
    )
    .unwrap()
});

/// Starr instances with sweeping enabled.
pub static INSTANCES_ENABLED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reaparr_instances_enabled",
        "Number of Starr instances with sweeping enabled",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Sweeper status
    registry.register(Box::new(SWEEP_ENABLED.clone())).unwrap();
    registry.register(Box::new(SWEEP_DRY_RUN.clone())).unwrap();
    registry
        .register(Box::new(INSTANCES_CONFIGURED.clone()))
        .unwrap();
    registry
        .register(Box::new(INSTANCES_ENABLED.clone()))
        .unwrap();

    // Core metrics (sweep cycles, per-app item counters)
    for metric in reaparr_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update the sweeper gauges
/// with current values from the orchestrator.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.orchestrator().status();
    SWEEP_ENABLED.set(if status.enabled { 1 } else { 0 });
    SWEEP_DRY_RUN.set(if status.dry_run { 1 } else { 0 });
    INSTANCES_CONFIGURED.set(status.instances_configured as i64);
    INSTANCES_ENABLED.set(status.instances_enabled as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("reaparr_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        // Touch all metrics to ensure they appear in output
        // (Prometheus only outputs metrics that have been accessed)
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        SWEEP_ENABLED.set(0);
        SWEEP_DRY_RUN.set(0);
        INSTANCES_CONFIGURED.set(0);
        INSTANCES_ENABLED.set(0);

        let output = encode_metrics();

        // HTTP metrics
        assert!(output.contains("reaparr_http_request_duration_seconds"));
        assert!(output.contains("reaparr_http_requests_total"));
        assert!(output.contains("reaparr_http_requests_in_flight"));

        // Sweeper gauges
        assert!(output.contains("reaparr_sweep_enabled"));
        assert!(output.contains("reaparr_sweep_dry_run"));
        assert!(output.contains("reaparr_instances_configured"));
        assert!(output.contains("reaparr_instances_enabled"));
    }
}
