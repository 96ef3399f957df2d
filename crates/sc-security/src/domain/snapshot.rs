//! # Security Snapshot
//!
//! The immutable view of participant, traffic, and reputation state a
//! monitoring tick runs against. Detectors are pure functions of one
//! snapshot; nothing they see can change under them mid-tick.

use std::collections::HashMap;

use shared_types::{Hash, NodeId, Participant, Timestamp};

/// One consensus message as observed by the transport layer.
///
/// Only the attribution triple survives into the snapshot; payloads stay
/// in the consensus layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedMessage {
    /// The signing sender.
    pub sender: NodeId,
    /// Hash of the full message.
    pub message_hash: Hash,
    /// Consensus round the message belongs to.
    pub round: u64,
}

/// Immutable per-tick view of the system.
#[derive(Debug, Clone, Default)]
pub struct SecuritySnapshot {
    /// When the snapshot was taken.
    pub taken_at: Timestamp,
    /// Every current participant.
    pub participants: Vec<Participant>,
    /// Most recent per-node message rates (messages per second), as
    /// reported by the transport layer.
    pub message_rates: HashMap<NodeId, u32>,
    /// The batch of consensus messages observed since the previous tick.
    pub recent_messages: Vec<ObservedMessage>,
    /// Frozen reputation scores.
    pub reputation: HashMap<NodeId, f64>,
    /// Participants scoring strictly above the honesty threshold at
    /// snapshot time.
    pub honest_peer_count: usize,
}

impl SecuritySnapshot {
    /// Total participants in the snapshot.
    pub fn total_peers(&self) -> usize {
        self.participants.len()
    }
}
