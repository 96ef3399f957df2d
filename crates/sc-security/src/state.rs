//! Mutable state of the security orchestrator.
//!
//! The participant set and the reputation registry are the only mutable
//! state shared between the monitoring tick and on-demand operations; both
//! sit behind `parking_lot` locks so snapshot reads never observe torn
//! writes. Key-epoch state uses an async `tokio::sync::RwLock` because the
//! rotation sweep must hold it exclusively across await points.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use shared_types::{KeyEpochId, NodeId, SecurityMetrics};
use tokio::task::JoinHandle;

use crate::domain::{EventLog, ObservedMessage, ParticipantSet, ReputationRegistry};

/// Active-epoch record guarded by the rotation lock.
#[derive(Debug, Default)]
pub struct KeyState {
    /// The one active epoch; `None` before initialization.
    pub active: Option<KeyEpochId>,
    /// Retired epoch ids, for audit correlation only.
    pub archived: Vec<KeyEpochId>,
}

/// Monotonic counters and latency gauges, accumulated via atomics.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    threats_detected: AtomicU64,
    byzantine_nodes_isolated: AtomicU64,
    sybil_attempts: AtomicU64,
    eclipse_attempts: AtomicU64,
    dos_attempts: AtomicU64,
    consensus_successes: AtomicU64,
    consensus_failures: AtomicU64,
    key_rotations: AtomicU64,
    signature_latency_ms: AtomicU64,
    proof_latency_ms: AtomicU64,
    rotation_latency_ms: AtomicU64,
}

impl MetricsRecorder {
    pub fn record_threat(&self, kind_label: &str) {
        self.threats_detected.fetch_add(1, Ordering::Relaxed);
        match kind_label {
            "sybil" => self.sybil_attempts.fetch_add(1, Ordering::Relaxed),
            "eclipse" => self.eclipse_attempts.fetch_add(1, Ordering::Relaxed),
            "dos" => self.dos_attempts.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };
        crate::metrics::record_threat_detected(kind_label);
    }

    pub fn record_isolated(&self, count: u64) {
        self.byzantine_nodes_isolated
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_consensus_outcome(&self, success: bool) {
        if success {
            self.consensus_successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.consensus_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rotation(&self, latency_ms: u64) {
        self.key_rotations.fetch_add(1, Ordering::Relaxed);
        self.rotation_latency_ms.store(latency_ms, Ordering::Relaxed);
        crate::metrics::record_key_rotation();
        crate::metrics::record_rotation_latency(latency_ms as f64 / 1000.0);
    }

    pub fn record_signature_latency(&self, latency_ms: u64) {
        self.signature_latency_ms
            .store(latency_ms, Ordering::Relaxed);
        crate::metrics::record_signature_latency(latency_ms as f64 / 1000.0);
    }

    pub fn record_proof_latency(&self, latency_ms: u64) {
        self.proof_latency_ms.store(latency_ms, Ordering::Relaxed);
    }

    /// Frozen copy for `get_metrics`.
    pub fn snapshot(&self) -> SecurityMetrics {
        SecurityMetrics {
            threats_detected: self.threats_detected.load(Ordering::Relaxed),
            byzantine_nodes_isolated: self.byzantine_nodes_isolated.load(Ordering::Relaxed),
            sybil_attempts: self.sybil_attempts.load(Ordering::Relaxed),
            eclipse_attempts: self.eclipse_attempts.load(Ordering::Relaxed),
            dos_attempts: self.dos_attempts.load(Ordering::Relaxed),
            consensus_successes: self.consensus_successes.load(Ordering::Relaxed),
            consensus_failures: self.consensus_failures.load(Ordering::Relaxed),
            key_rotations: self.key_rotations.load(Ordering::Relaxed),
            signature_latency_ms: self.signature_latency_ms.load(Ordering::Relaxed),
            proof_latency_ms: self.proof_latency_ms.load(Ordering::Relaxed),
            rotation_latency_ms: self.rotation_latency_ms.load(Ordering::Relaxed),
        }
    }
}

/// Encapsulates all mutable state of the security orchestrator.
pub struct SecurityState {
    /// The participant arena.
    pub participants: RwLock<ParticipantSet>,
    /// Trust scores; written only through mitigation decisions.
    pub reputation: RwLock<ReputationRegistry>,
    /// Append-only audit event history.
    pub events: RwLock<EventLog>,
    /// Counters and gauges.
    pub metrics: MetricsRecorder,
    /// Active key epoch; held exclusively across the rotation sweep.
    pub key_state: tokio::sync::RwLock<KeyState>,
    /// Latest per-node message rates from the transport layer.
    pub traffic: RwLock<HashMap<NodeId, u32>>,
    /// Consensus messages buffered since the last tick.
    pub message_buffer: RwLock<Vec<ObservedMessage>>,
    /// Byzantine detections since the last policy rotation.
    pub byzantine_since_rotation: AtomicU64,
    /// True between successful `initialize` and `shutdown`.
    pub initialized: AtomicBool,
    /// Cleared first during shutdown so no new tick starts.
    pub running: AtomicBool,
    /// Handle of the monitoring task, held for the shutdown grace wait.
    pub monitor_handle: Mutex<Option<JoinHandle<()>>>,
    /// This node's identity, set during initialization.
    pub local_node_id: RwLock<Option<NodeId>>,
    /// This node's identity signing key (node identity, not consensus
    /// signing), generated during initialization.
    pub identity_key: RwLock<Option<ed25519_dalek::SigningKey>>,
}

impl SecurityState {
    pub fn new() -> Self {
        Self::with_adjustment_cap(crate::domain::MAX_SINGLE_ADJUSTMENT)
    }

    /// State whose reputation registry enforces the given per-call
    /// adjustment cap (the policy table's `max_single_adjustment`).
    pub fn with_adjustment_cap(cap: f64) -> Self {
        Self {
            participants: RwLock::new(ParticipantSet::new()),
            reputation: RwLock::new(ReputationRegistry::with_adjustment_cap(cap)),
            events: RwLock::new(EventLog::new()),
            metrics: MetricsRecorder::default(),
            key_state: tokio::sync::RwLock::new(KeyState::default()),
            traffic: RwLock::new(HashMap::new()),
            message_buffer: RwLock::new(Vec::new()),
            byzantine_since_rotation: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
            running: AtomicBool::new(false),
            monitor_handle: Mutex::new(None),
            local_node_id: RwLock::new(None),
            identity_key: RwLock::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for SecurityState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recorder_counts_by_kind() {
        let m = MetricsRecorder::default();
        m.record_threat("sybil");
        m.record_threat("sybil");
        m.record_threat("dos");
        m.record_threat("byzantine");

        let snap = m.snapshot();
        assert_eq!(snap.threats_detected, 4);
        assert_eq!(snap.sybil_attempts, 2);
        assert_eq!(snap.dos_attempts, 1);
        assert_eq!(snap.eclipse_attempts, 0);
    }

    #[test]
    fn test_consensus_outcomes() {
        let m = MetricsRecorder::default();
        m.record_consensus_outcome(true);
        m.record_consensus_outcome(false);
        m.record_consensus_outcome(false);

        let snap = m.snapshot();
        assert_eq!(snap.consensus_successes, 1);
        assert_eq!(snap.consensus_failures, 2);
    }

    #[test]
    fn test_state_starts_uninitialized() {
        let state = SecurityState::new();
        assert!(!state.is_initialized());
        assert!(!state.is_running());
        assert!(state.participants.read().is_empty());
    }
}
