//! # Sybil Detection
//!
//! Clusters participants by their full network fingerprint (subnet, AS
//! number, region). Genuinely independent operators rarely share all three
//! attributes, so an oversized cluster is cheap, explainable evidence of
//! one adversary running many identities. Clustering is a precursor to
//! stronger identity proofs, which mitigation requests separately.

use std::collections::HashMap;

use shared_types::{AttackKind, AttackReport, NetworkFingerprint, NodeId, Severity};

use crate::domain::config::DetectorThresholds;
use crate::domain::snapshot::SecuritySnapshot;

/// Report every fingerprint group larger than `sybil_threshold`.
///
/// One report per cluster, naming every member. Reports are ordered by
/// their lowest member id so output is deterministic across runs.
pub fn detect(snapshot: &SecuritySnapshot, thresholds: &DetectorThresholds) -> Vec<AttackReport> {
    let mut groups: HashMap<&NetworkFingerprint, Vec<NodeId>> = HashMap::new();
    for participant in &snapshot.participants {
        groups
            .entry(&participant.fingerprint)
            .or_default()
            .push(participant.node_id);
    }

    let mut reports: Vec<AttackReport> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > thresholds.sybil_threshold)
        .map(|(fingerprint, mut members)| {
            members.sort();
            let suspicion = (members.len() as f64 * 0.1).min(1.0);
            AttackReport {
                kind: AttackKind::Sybil {
                    fingerprint: fingerprint.clone(),
                    suspicion,
                },
                severity: Severity::High,
                affected_nodes: members,
                detected_at: snapshot.taken_at,
            }
        })
        .collect();

    reports.sort_by(|a, b| a.affected_nodes.cmp(&b.affected_nodes));
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Participant, Timestamp};

    fn participant(b: u8, fingerprint: NetworkFingerprint) -> Participant {
        Participant {
            node_id: NodeId::new([b; 32]),
            public_key: vec![b],
            fingerprint,
            joined_at: Timestamp::new(1000),
        }
    }

    fn shared_fp() -> NetworkFingerprint {
        NetworkFingerprint::new("203.0.113.0/24", 64512, "eu-west")
    }

    fn snapshot(participants: Vec<Participant>) -> SecuritySnapshot {
        SecuritySnapshot {
            taken_at: Timestamp::new(2000),
            participants,
            ..SecuritySnapshot::default()
        }
    }

    fn thresholds(sybil: usize) -> DetectorThresholds {
        DetectorThresholds {
            sybil_threshold: sybil,
            ..DetectorThresholds::default()
        }
    }

    #[test]
    fn test_cluster_above_threshold_reported_once() {
        let snap = snapshot(vec![
            participant(1, shared_fp()),
            participant(2, shared_fp()),
            participant(3, shared_fp()),
        ]);

        let reports = detect(&snap, &thresholds(2));

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.severity, Severity::High);
        assert_eq!(report.affected_nodes.len(), 3);
        match &report.kind {
            AttackKind::Sybil { suspicion, .. } => {
                assert!((suspicion - 0.3).abs() < 1e-9);
            }
            other => panic!("expected Sybil, got {other:?}"),
        }
    }

    #[test]
    fn test_group_at_threshold_not_reported() {
        // Threshold is strict: a group of exactly sybil_threshold is fine
        let snap = snapshot(vec![
            participant(1, shared_fp()),
            participant(2, shared_fp()),
        ]);

        assert!(detect(&snap, &thresholds(2)).is_empty());
    }

    #[test]
    fn test_distinct_fingerprints_not_clustered() {
        let snap = snapshot(vec![
            participant(1, NetworkFingerprint::new("10.0.0.0/24", 100, "eu-west")),
            participant(2, NetworkFingerprint::new("10.0.1.0/24", 100, "eu-west")),
            participant(3, NetworkFingerprint::new("10.0.0.0/24", 100, "us-east")),
        ]);

        assert!(detect(&snap, &thresholds(2)).is_empty());
    }

    #[test]
    fn test_suspicion_saturates_at_one() {
        let members: Vec<Participant> = (0..12).map(|i| participant(i, shared_fp())).collect();
        let snap = snapshot(members);

        let reports = detect(&snap, &thresholds(2));
        assert_eq!(reports.len(), 1);
        match &reports[0].kind {
            AttackKind::Sybil { suspicion, .. } => assert_eq!(*suspicion, 1.0),
            other => panic!("expected Sybil, got {other:?}"),
        }
    }

    #[test]
    fn test_two_clusters_two_reports() {
        let fp_a = NetworkFingerprint::new("10.0.0.0/24", 100, "eu-west");
        let fp_b = NetworkFingerprint::new("192.0.2.0/24", 200, "us-east");
        let snap = snapshot(vec![
            participant(1, fp_a.clone()),
            participant(2, fp_a.clone()),
            participant(3, fp_a),
            participant(4, fp_b.clone()),
            participant(5, fp_b.clone()),
            participant(6, fp_b),
        ]);

        let reports = detect(&snap, &thresholds(2));
        assert_eq!(reports.len(), 2);
        // Deterministic ordering by lowest member id
        assert_eq!(reports[0].affected_nodes[0], NodeId::new([1; 32]));
        assert_eq!(reports[1].affected_nodes[0], NodeId::new([4; 32]));
    }
}
