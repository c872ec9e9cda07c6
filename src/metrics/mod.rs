//! Prometheus metrics for the sweep engine
//!
//! This module tracks sweep outcomes and channel verdicts.
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

use crate::models::SweepReport;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all sweep metrics
struct SweepMetrics {
    sweeps: Counter,
    sweep_failures: CounterVec,
    channels_checked: CounterVec,
    valid_channels: Gauge,
    dead_channels: Gauge,
    sweep_duration: Histogram,
}

/// Global storage for sweep metrics
static SWEEP_METRICS: OnceLock<SweepMetrics> = OnceLock::new();

/// Serializes registration so concurrent callers do not double-register
static INIT_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers anything.
///
/// # Errors
///
/// Returns the registration error if any metric could not be registered.
/// The application can continue without metrics.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if SWEEP_METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = SweepMetrics {
        sweeps: register_counter!("iptv_sweep_sweeps_total", "Total completed sweeps")?,
        sweep_failures: register_counter_vec!(
            "iptv_sweep_sweep_failures_total",
            "Total aborted sweeps by reason",
            &["reason"]
        )?,
        channels_checked: register_counter_vec!(
            "iptv_sweep_channels_checked_total",
            "Total channels checked by verdict",
            &["verdict"]
        )?,
        valid_channels: register_gauge!(
            "iptv_sweep_valid_channels",
            "Valid channels in the latest sweep"
        )?,
        dead_channels: register_gauge!(
            "iptv_sweep_dead_channels",
            "Dead channels in the latest sweep"
        )?,
        sweep_duration: register_histogram!(
            "iptv_sweep_sweep_duration_seconds",
            "Wall-clock duration of a full sweep in seconds",
            vec![10.0, 30.0, 60.0, 300.0, 600.0, 1800.0, 3600.0, 7200.0, 10800.0]
        )?,
    };

    if SWEEP_METRICS.set(metrics).is_ok() {
        tracing::info!("Prometheus metrics initialized successfully");
    }
    Ok(())
}

// ============================================================================
// Recording
// ============================================================================

/// Record a completed sweep
pub fn record_sweep(report: &SweepReport) {
    if let Some(m) = SWEEP_METRICS.get() {
        m.sweeps.inc();
        m.channels_checked
            .with_label_values(&["valid"])
            .inc_by(report.valid as f64);
        m.channels_checked
            .with_label_values(&["dead"])
            .inc_by(report.dead as f64);
        m.valid_channels.set(report.valid as f64);
        m.dead_channels.set(report.dead as f64);
        m.sweep_duration.observe(report.duration().as_secs_f64());
    }
}

/// Record an aborted sweep
pub fn record_sweep_failure(reason: &str) {
    if let Some(m) = SWEEP_METRICS.get() {
        m.sweep_failures.with_label_values(&[reason]).inc();
    }
}

/// Render all registered metrics in the Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
