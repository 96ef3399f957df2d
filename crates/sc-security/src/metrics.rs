//! # Security Metrics
//!
//! Prometheus metrics for monitoring the security subsystem.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! sc-security = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `security_threats_detected_total` - Counter of attack reports (by kind)
//! - `security_key_rotations_total` - Counter of completed key rotations
//! - `security_signature_latency_seconds` - Histogram of signature times
//! - `security_rotation_latency_seconds` - Histogram of rotation times

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total attack reports, labeled by attack kind
    pub static ref THREATS_DETECTED: CounterVec = register_counter_vec!(
        "security_threats_detected_total",
        "Total number of attack reports produced",
        &["kind"]
    )
    .expect("Failed to create THREATS_DETECTED metric");

    /// Total completed key rotations
    pub static ref KEY_ROTATIONS: IntCounter = register_int_counter!(
        "security_key_rotations_total",
        "Total number of completed key rotations"
    )
    .expect("Failed to create KEY_ROTATIONS metric");

    /// Histogram of threshold-signature latency
    pub static ref SIGNATURE_LATENCY: Histogram = register_histogram!(
        "security_signature_latency_seconds",
        "Time taken to create a threshold signature in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to create SIGNATURE_LATENCY metric");

    /// Histogram of key-rotation latency
    pub static ref ROTATION_LATENCY: Histogram = register_histogram!(
        "security_rotation_latency_seconds",
        "Time taken to complete a key rotation in seconds",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]
    )
    .expect("Failed to create ROTATION_LATENCY metric");
}

/// Record an attack report with its kind
#[cfg(feature = "metrics")]
pub fn record_threat_detected(kind: &str) {
    THREATS_DETECTED.with_label_values(&[kind]).inc();
}

/// Record a completed key rotation
#[cfg(feature = "metrics")]
pub fn record_key_rotation() {
    KEY_ROTATIONS.inc();
}

/// Record signature creation latency
#[cfg(feature = "metrics")]
pub fn record_signature_latency(seconds: f64) {
    SIGNATURE_LATENCY.observe(seconds);
}

/// Record key rotation latency
#[cfg(feature = "metrics")]
pub fn record_rotation_latency(seconds: f64) {
    ROTATION_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_threat_detected(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_key_rotation() {}

#[cfg(not(feature = "metrics"))]
pub fn record_signature_latency(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rotation_latency(_seconds: f64) {}
