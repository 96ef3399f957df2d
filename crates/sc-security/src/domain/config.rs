//! Configuration for the security subsystem.
//!
//! Detector thresholds and mitigation penalties are deliberately separate
//! tables: thresholds decide *when* evidence becomes a report, the policy
//! decides *what* a report costs the offender.

use std::time::Duration;

use crate::domain::keys::CurveKind;

/// Thresholds the attack detectors run against.
#[derive(Clone, Debug)]
pub struct DetectorThresholds {
    /// A fingerprint group larger than this is reported as a Sybil cluster.
    pub sybil_threshold: usize,
    /// Messages per second above which a participant is a DoS offender.
    pub dos_threshold: u32,
    /// Reputation above this counts a peer as honest.
    pub honesty_threshold: f64,
    /// Honest-peer ratio below this triggers an eclipse report.
    pub min_honest_ratio: f64,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            sybil_threshold: 3,
            dos_threshold: 1_000,
            honesty_threshold: 0.6,
            min_honest_ratio: 0.3,
        }
    }
}

/// Reputation deltas and mitigation knobs, tunable per deployment.
#[derive(Clone, Debug)]
pub struct MitigationPolicy {
    /// Applied to every node in a Sybil cluster.
    pub sybil_penalty: f64,
    /// Applied to a DoS offender alongside rate limiting. Small on purpose:
    /// the primary response is throttling, sustained offense accumulates
    /// through repeated reports.
    pub dos_penalty: f64,
    /// Hard cap on the magnitude of any single reputation adjustment.
    pub max_single_adjustment: f64,
    /// Per-maintenance-pass regression of scores towards neutral.
    pub decay_factor: f64,
    /// How many high-reputation peers to reconnect to after an eclipse.
    pub eclipse_target_peers: usize,
}

impl Default for MitigationPolicy {
    fn default() -> Self {
        Self {
            sybil_penalty: -0.3,
            dos_penalty: -0.05,
            max_single_adjustment: 0.3,
            decay_factor: 0.9,
            eclipse_target_peers: 8,
        }
    }
}

/// Top-level configuration of the security orchestrator.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Monitoring tick period.
    pub check_interval: Duration,
    /// Detector thresholds.
    pub thresholds: DetectorThresholds,
    /// Mitigation policy table.
    pub policy: MitigationPolicy,
    /// `t` in t-of-n threshold signing.
    pub signature_threshold: usize,
    /// Curve requested from the cryptographic service.
    pub curve: CurveKind,
    /// Byzantine detections that trigger a policy key rotation; 0 disables.
    pub byzantine_rotation_threshold: u64,
    /// How long `shutdown()` waits for an in-flight tick.
    pub shutdown_grace: Duration,
    /// Cap on buffered consensus messages between ticks.
    pub message_buffer_limit: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            thresholds: DetectorThresholds::default(),
            policy: MitigationPolicy::default(),
            signature_threshold: 2,
            curve: CurveKind::Secp256k1,
            byzantine_rotation_threshold: 0,
            shutdown_grace: Duration::from_secs(5),
            message_buffer_limit: 10_000,
        }
    }
}

impl SecurityConfig {
    /// Fast cadence and low thresholds for tests.
    pub fn for_testing() -> Self {
        Self {
            check_interval: Duration::from_millis(20),
            thresholds: DetectorThresholds {
                sybil_threshold: 2,
                dos_threshold: 100,
                ..DetectorThresholds::default()
            },
            shutdown_grace: Duration::from_millis(200),
            ..Self::default()
        }
    }
}
