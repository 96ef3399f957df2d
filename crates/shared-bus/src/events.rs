//! # Security Bus Events
//!
//! Defines the closed set of notifications the security subsystem emits.
//! Audit-grade payloads ride along as `SecurityEvent` records from
//! `shared-types`; membership notifications carry only the node id.

use serde::{Deserialize, Serialize};
use shared_types::{NodeId, SecurityEvent};

/// All notifications that can be published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SecurityBusEvent {
    /// The orchestrator completed initialization and the monitoring loop
    /// is running.
    Initialized {
        /// This node's identity.
        node_id: NodeId,
    },

    /// A detector produced an attack report; the embedded event carries the
    /// full report for audit.
    AttackDetected(SecurityEvent),

    /// A mitigation completed for a previously detected attack.
    ThreatMitigated(SecurityEvent),

    /// The active distributed key moved to a new epoch.
    KeyRotated(SecurityEvent),

    /// The consensus layer reported a failed round.
    ConsensusFailure(SecurityEvent),

    /// A participant joined (or had its metadata overwritten).
    ParticipantAdded {
        /// The admitted node.
        node_id: NodeId,
    },

    /// A participant was removed or isolated.
    ParticipantRemoved {
        /// The removed node.
        node_id: NodeId,
    },
}

impl SecurityBusEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Initialized { .. } => EventTopic::Lifecycle,
            Self::AttackDetected(_) | Self::ThreatMitigated(_) => EventTopic::Attacks,
            Self::KeyRotated(_) => EventTopic::KeyLifecycle,
            Self::ConsensusFailure(_) => EventTopic::ConsensusHealth,
            Self::ParticipantAdded { .. } | Self::ParticipantRemoved { .. } => {
                EventTopic::Membership
            }
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Orchestrator lifecycle (initialized, shut down).
    Lifecycle,
    /// Attack detection and mitigation.
    Attacks,
    /// Key generation and rotation.
    KeyLifecycle,
    /// Consensus round outcomes.
    ConsensusHealth,
    /// Participant set changes.
    Membership,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SecurityBusEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
