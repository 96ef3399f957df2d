//! # Consensus Monitor Adapters
//!
//! `EquivocationMonitor` is the default Byzantine oracle: it scans the
//! tick's batch of observed consensus messages for nodes that signed two
//! different messages in the same round. Equivocation costs an attacker
//! nothing to attempt, so it is the first Byzantine signal worth wiring;
//! richer monitors plug in behind the same port.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use shared_types::{AttackKind, AttackReport, Contradiction, Hash, NodeId, Severity};

use crate::domain::{DetectorThresholds, SecuritySnapshot};
use crate::ports::ConsensusMonitor;

/// Detects double-signing within one snapshot's message batch.
#[derive(Debug, Default)]
pub struct EquivocationMonitor;

impl EquivocationMonitor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConsensusMonitor for EquivocationMonitor {
    async fn configure(&self, _thresholds: &DetectorThresholds) -> Result<(), String> {
        // Equivocation scanning has no tunable thresholds
        Ok(())
    }

    async fn detect_byzantine_attacks(
        &self,
        snapshot: &SecuritySnapshot,
    ) -> Result<Vec<AttackReport>, String> {
        // (sender, round) -> first message hash seen
        let mut first_seen: HashMap<(NodeId, u64), Hash> = HashMap::new();
        let mut contradictions: Vec<Contradiction> = Vec::new();
        let mut offenders: BTreeSet<NodeId> = BTreeSet::new();

        for message in &snapshot.recent_messages {
            let key = (message.sender, message.round);
            match first_seen.get(&key) {
                Some(prev_hash) if *prev_hash != message.message_hash => {
                    // Same-round repeats of an already-recorded conflict
                    // add no new evidence
                    if offenders.insert(message.sender) {
                        contradictions.push(Contradiction {
                            node_id: message.sender,
                            conflicting_message_hashes: (*prev_hash, message.message_hash),
                        });
                    }
                }
                Some(_) => {}
                None => {
                    first_seen.insert(key, message.message_hash);
                }
            }
        }

        if contradictions.is_empty() {
            return Ok(Vec::new());
        }

        contradictions.sort_by_key(|c| c.node_id);
        Ok(vec![AttackReport {
            kind: AttackKind::Byzantine { contradictions },
            severity: Severity::Critical,
            affected_nodes: offenders.into_iter().collect(),
            detected_at: snapshot.taken_at,
        }])
    }
}

/// Oracle that never reports anything; for tests and minimal deployments.
#[derive(Debug, Default)]
pub struct NullConsensusMonitor;

impl NullConsensusMonitor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConsensusMonitor for NullConsensusMonitor {
    async fn configure(&self, _thresholds: &DetectorThresholds) -> Result<(), String> {
        Ok(())
    }

    async fn detect_byzantine_attacks(
        &self,
        _snapshot: &SecuritySnapshot,
    ) -> Result<Vec<AttackReport>, String> {
        Ok(Vec::new())
    }
}
