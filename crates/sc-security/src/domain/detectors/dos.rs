//! # DoS Detection
//!
//! Compares each participant's recent message rate, as reported by the
//! transport layer, against the configured ceiling. One report per
//! offender: each is rate-limited independently by mitigation.

use shared_types::{AttackKind, AttackReport, Severity};

use crate::domain::config::DetectorThresholds;
use crate::domain::snapshot::SecuritySnapshot;

/// Report every participant whose observed rate exceeds `dos_threshold`.
///
/// Rates for nodes no longer in the participant set are ignored; output is
/// ordered by node id for determinism.
pub fn detect(snapshot: &SecuritySnapshot, thresholds: &DetectorThresholds) -> Vec<AttackReport> {
    let mut reports: Vec<AttackReport> = snapshot
        .participants
        .iter()
        .filter_map(|participant| {
            let rate = *snapshot.message_rates.get(&participant.node_id)?;
            if rate <= thresholds.dos_threshold {
                return None;
            }
            Some(AttackReport {
                kind: AttackKind::Dos {
                    observed_rate: rate,
                },
                severity: Severity::High,
                affected_nodes: vec![participant.node_id],
                detected_at: snapshot.taken_at,
            })
        })
        .collect();

    reports.sort_by(|a, b| a.affected_nodes.cmp(&b.affected_nodes));
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{NetworkFingerprint, NodeId, Participant, Timestamp};
    use std::collections::HashMap;

    fn snapshot(rates: &[(u8, u32)]) -> SecuritySnapshot {
        let participants = rates
            .iter()
            .map(|(b, _)| Participant {
                node_id: NodeId::new([*b; 32]),
                public_key: vec![*b],
                fingerprint: NetworkFingerprint::new(format!("10.0.{b}.0/24"), *b as u32, "eu"),
                joined_at: Timestamp::new(0),
            })
            .collect();
        let message_rates: HashMap<NodeId, u32> = rates
            .iter()
            .map(|(b, r)| (NodeId::new([*b; 32]), *r))
            .collect();
        SecuritySnapshot {
            taken_at: Timestamp::new(700),
            participants,
            message_rates,
            ..SecuritySnapshot::default()
        }
    }

    fn thresholds(dos: u32) -> DetectorThresholds {
        DetectorThresholds {
            dos_threshold: dos,
            ..DetectorThresholds::default()
        }
    }

    #[test]
    fn test_one_report_per_offender() {
        let snap = snapshot(&[(1, 50), (2, 500), (3, 700)]);

        let reports = detect(&snap, &thresholds(100));

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].affected_nodes, vec![NodeId::new([2; 32])]);
        assert_eq!(reports[1].affected_nodes, vec![NodeId::new([3; 32])]);
        assert!(reports.iter().all(|r| r.severity == Severity::High));
    }

    #[test]
    fn test_rate_at_threshold_not_reported() {
        let snap = snapshot(&[(1, 100)]);
        assert!(detect(&snap, &thresholds(100)).is_empty());
    }

    #[test]
    fn test_unknown_rate_not_reported() {
        // Participant present but transport supplied no rate for it
        let mut snap = snapshot(&[(1, 500)]);
        snap.message_rates.clear();

        assert!(detect(&snap, &thresholds(100)).is_empty());
    }

    #[test]
    fn test_rate_for_removed_node_ignored() {
        let mut snap = snapshot(&[(1, 50)]);
        // Stale rate for a node not in the participant set
        snap.message_rates.insert(NodeId::new([9; 32]), 9999);

        assert!(detect(&snap, &thresholds(100)).is_empty());
    }

    #[test]
    fn test_observed_rate_carried_in_report() {
        let snap = snapshot(&[(4, 555)]);
        let reports = detect(&snap, &thresholds(100));

        match reports[0].kind {
            AttackKind::Dos { observed_rate } => assert_eq!(observed_rate, 555),
            _ => panic!("expected Dos"),
        }
    }
}
