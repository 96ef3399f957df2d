//! # Security Events & Attack Reports
//!
//! The closed taxonomy of everything the security subsystem can observe
//! (attack reports) and record (security events). Events are append-only:
//! once created they are never mutated, and consumers dispatch on the tagged
//! `SecurityEventKind` so a new kind is a compile-time-visible change.

use crate::entities::{Hash, KeyEpochId, NetworkFingerprint, NodeId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SEVERITY
// =============================================================================

/// Severity grade attached to reports and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

// =============================================================================
// ATTACK REPORTS (transient, produced per monitoring tick)
// =============================================================================

/// Two conflicting consensus messages signed by the same node.
///
/// This is the structural evidence a Byzantine report carries: the node and
/// the hashes of the two messages that cannot both be honest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    /// The equivocating node.
    pub node_id: NodeId,
    /// Hashes of the conflicting messages.
    pub conflicting_message_hashes: (Hash, Hash),
}

/// Attack classification with kind-specific evidence.
///
/// Dispatch is by exhaustive match; adding a kind forces every mitigation
/// and audit path to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Nodes sent conflicting consensus messages.
    Byzantine {
        /// The contradicting message pairs, one per implicated node.
        contradictions: Vec<Contradiction>,
    },
    /// A cluster of participants shares one network fingerprint.
    Sybil {
        /// The shared fingerprint.
        fingerprint: NetworkFingerprint,
        /// `min(1.0, group_size * 0.1)`.
        suspicion: f64,
    },
    /// This node's honest-peer ratio dropped below the safe floor.
    Eclipse {
        /// Participants with reputation above the honesty threshold.
        honest_peers: usize,
        /// Total participants.
        total_peers: usize,
    },
    /// A participant exceeded the per-node message-rate ceiling.
    Dos {
        /// Messages per second observed by the transport layer.
        observed_rate: u32,
    },
}

impl AttackKind {
    /// Stable label for metrics and audit context.
    pub fn label(&self) -> &'static str {
        match self {
            AttackKind::Byzantine { .. } => "byzantine",
            AttackKind::Sybil { .. } => "sybil",
            AttackKind::Eclipse { .. } => "eclipse",
            AttackKind::Dos { .. } => "dos",
        }
    }
}

/// One detector finding from one monitoring tick.
///
/// Consumed by the mitigation engine within the same tick; never stored as
/// its own entity. The `AttackDetected` event embeds a copy for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    /// Classification and evidence.
    pub kind: AttackKind,
    /// Severity assigned by the detector.
    pub severity: Severity,
    /// Every node implicated by this report.
    pub affected_nodes: Vec<NodeId>,
    /// Tick timestamp the report was produced at.
    pub detected_at: Timestamp,
}

// =============================================================================
// MITIGATION ACTIONS
// =============================================================================

/// The remediation applied for one attack report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MitigationAction {
    /// Reputation penalty applied to each affected node.
    ReputationPenalty {
        /// Signed delta per node (negative for penalties).
        delta: f64,
        /// Nodes the delta was applied to.
        nodes: Vec<NodeId>,
    },
    /// Transport asked to re-verify the identities of the affected nodes.
    IdentityVerificationRequested { nodes: Vec<NodeId> },
    /// Connections rebuilt towards high-reputation peers.
    ConnectionsRebuilt { target_peers: Vec<NodeId> },
    /// Rate limiting and message filtering applied to an offender.
    RateLimited { node: NodeId },
    /// Contradicting nodes removed from the participant set.
    Isolated { nodes: Vec<NodeId> },
    /// Consensus layer told to restart the current round.
    ConsensusRestartRequested,
}

// =============================================================================
// SECURITY EVENTS (append-only audit records)
// =============================================================================

/// Event classification with kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SecurityEventKind {
    /// A detector produced an attack report.
    AttackDetected {
        /// The report, embedded verbatim for audit.
        report: AttackReport,
    },
    /// The active distributed key changed epochs.
    KeyRotation {
        old_key: KeyEpochId,
        new_key: KeyEpochId,
    },
    /// A mitigation completed for an attack.
    ThreatMitigated {
        /// Label of the mitigated attack kind.
        attack: String,
        /// What was done.
        action: MitigationAction,
    },
    /// The consensus layer reported a failed round.
    ConsensusFailure {
        /// Reason supplied by the consensus layer.
        reason: String,
    },
}

impl SecurityEventKind {
    /// Stable label for metrics and audit context.
    pub fn label(&self) -> &'static str {
        match self {
            SecurityEventKind::AttackDetected { .. } => "attack_detected",
            SecurityEventKind::KeyRotation { .. } => "key_rotation",
            SecurityEventKind::ThreatMitigated { .. } => "threat_mitigated",
            SecurityEventKind::ConsensusFailure { .. } => "consensus_failure",
        }
    }
}

/// One append-only audit record.
///
/// Never mutated after creation; retained for the lifetime of the process
/// (durable persistence is the audit sink's concern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event id.
    pub id: Uuid,
    /// Creation time.
    pub timestamp: Timestamp,
    /// Severity grade.
    pub severity: Severity,
    /// The primary node this event concerns, when there is a single one.
    pub node_id: Option<NodeId>,
    /// Kind-specific payload.
    pub kind: SecurityEventKind,
}

impl SecurityEvent {
    /// Create a new event with a fresh id.
    pub fn new(
        timestamp: Timestamp,
        severity: Severity,
        node_id: Option<NodeId>,
        kind: SecurityEventKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            severity,
            node_id,
            kind,
        }
    }
}
