//! # Attack Detectors
//!
//! Each detector is a pure function of one `SecuritySnapshot` and the
//! configured thresholds; none keeps state between ticks. Byzantine
//! detection is not here: it is delegated to the external consensus
//! monitor through its outbound port, and the orchestrator only routes
//! its reports.
//!
//! Within a tick the detectors run in a fixed order (Byzantine, Sybil,
//! Eclipse, DoS) and their reports are mitigated in that same order. A
//! node implicated by several detectors in one tick receives several
//! independent adjustments: each detector is an independent piece of
//! evidence, so no de-duplication is performed.

pub mod dos;
pub mod eclipse;
pub mod sybil;

use shared_types::AttackReport;

use crate::domain::config::DetectorThresholds;
use crate::domain::snapshot::SecuritySnapshot;

/// Run the local (non-oracle) detectors in their fixed order:
/// Sybil, Eclipse, DoS.
pub fn run_local_detectors(
    snapshot: &SecuritySnapshot,
    thresholds: &DetectorThresholds,
) -> Vec<AttackReport> {
    let mut reports = sybil::detect(snapshot, thresholds);
    reports.extend(eclipse::detect(snapshot, thresholds));
    reports.extend(dos::detect(snapshot, thresholds));
    reports
}
