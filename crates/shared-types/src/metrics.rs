//! # Security Metrics Snapshot
//!
//! The read-only counters/gauges view handed to external callers. The live
//! accumulation happens inside the security subsystem's state; this type is
//! the frozen copy a `get_metrics()` call returns.

use serde::{Deserialize, Serialize};

/// Monotonic counters and latency gauges for the security subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SecurityMetrics {
    /// Total attack reports seen across all detectors.
    pub threats_detected: u64,
    /// Nodes isolated after Byzantine evidence.
    pub byzantine_nodes_isolated: u64,
    /// Sybil reports produced.
    pub sybil_attempts: u64,
    /// Eclipse reports produced.
    pub eclipse_attempts: u64,
    /// DoS reports produced.
    pub dos_attempts: u64,
    /// Consensus rounds reported successful.
    pub consensus_successes: u64,
    /// Consensus rounds reported failed.
    pub consensus_failures: u64,
    /// Completed key rotations.
    pub key_rotations: u64,

    /// Most recent threshold-signature create latency, milliseconds.
    pub signature_latency_ms: u64,
    /// Most recent proof create/verify latency, milliseconds.
    pub proof_latency_ms: u64,
    /// Most recent key-rotation latency, milliseconds.
    pub rotation_latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_zero() {
        let m = SecurityMetrics::default();
        assert_eq!(m.threats_detected, 0);
        assert_eq!(m.consensus_failures, 0);
        assert_eq!(m.rotation_latency_ms, 0);
    }
}
