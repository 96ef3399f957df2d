//! # Eclipse Detection
//!
//! An eclipse attack starves a node of honest connections by surrounding
//! it with adversary-controlled peers. Without raw topology data, the
//! reputation-weighted peer ratio is the proxy for connectivity health:
//! when too few of our peers score above the honesty threshold, we must
//! assume we are being fenced in.

use shared_types::{AttackKind, AttackReport, Severity};

use crate::domain::config::DetectorThresholds;
use crate::domain::snapshot::SecuritySnapshot;

/// Fire one CRITICAL report when the honest-peer ratio drops below the
/// configured floor.
///
/// The victim is this node itself, so the report names no offenders.
pub fn detect(snapshot: &SecuritySnapshot, thresholds: &DetectorThresholds) -> Vec<AttackReport> {
    let total = snapshot.total_peers();
    if total == 0 {
        return Vec::new();
    }

    let honest = snapshot.honest_peer_count;
    let ratio = honest as f64 / total as f64;
    if ratio >= thresholds.min_honest_ratio {
        return Vec::new();
    }

    vec![AttackReport {
        kind: AttackKind::Eclipse {
            honest_peers: honest,
            total_peers: total,
        },
        severity: Severity::Critical,
        affected_nodes: Vec::new(),
        detected_at: snapshot.taken_at,
    }]
}
