//! Mitigation engine
//!
//! Translates one attack report into exactly one remediation plus exactly
//! one `AttackDetected` event. The event is appended before the action
//! runs (append-then-act): a failed mitigation can never erase the record
//! of the detection that triggered it. Byzantine reports additionally get
//! a `ThreatMitigated` event once isolation completes.

use std::collections::BTreeSet;
use std::sync::atomic::Ordering;

use shared_bus::SecurityBusEvent;
use shared_types::{
    AttackKind, AttackReport, Contradiction, MitigationAction, NodeId, SecurityEvent,
    SecurityEventKind,
};

use crate::ports::outbound::KeyVault;
use crate::ports::{
    AuditContext, AuditSink, ConsensusMonitor, SecurityNotifier, ThresholdCryptoService,
    TransportControl,
};

use super::SecurityOrchestrator;

impl<C, M, T, A, V, N> SecurityOrchestrator<C, M, T, A, V, N>
where
    C: ThresholdCryptoService,
    M: ConsensusMonitor,
    T: TransportControl,
    A: AuditSink,
    V: KeyVault,
    N: SecurityNotifier,
{
    /// Mitigate every report from one tick, in report order.
    ///
    /// Failures are contained per report: one failed mitigation is logged
    /// and the cycle moves to the next report.
    pub(crate) async fn handle_detected_attacks(&self, reports: Vec<AttackReport>) {
        for report in reports {
            self.state.metrics.record_threat(report.kind.label());

            // Append-then-act: the detection event exists before any
            // mitigation side effect
            let primary_node = match report.affected_nodes.as_slice() {
                [single] => Some(*single),
                _ => None,
            };
            let event = SecurityEvent::new(
                self.time_source.now(),
                report.severity,
                primary_node,
                SecurityEventKind::AttackDetected {
                    report: report.clone(),
                },
            );
            self.state.events.write().append(event.clone());
            if let Err(reason) = self
                .notifier
                .notify(SecurityBusEvent::AttackDetected(event))
                .await
            {
                self.audit.warn(
                    "Failed to publish attack notification",
                    &AuditContext::new().field("reason", reason),
                );
            }

            let outcome = match &report.kind {
                AttackKind::Sybil { .. } => self.mitigate_sybil(&report).await,
                AttackKind::Eclipse { .. } => self.mitigate_eclipse().await,
                AttackKind::Dos { .. } => self.mitigate_dos(&report).await,
                AttackKind::Byzantine { contradictions } => {
                    self.mitigate_byzantine(&report, contradictions).await
                }
            };

            match outcome {
                Ok(action) => self.audit.info(
                    "Threat mitigated",
                    &AuditContext::new()
                        .field("attack", report.kind.label())
                        .field("action", format!("{action:?}")),
                ),
                Err(reason) => self.audit.error(
                    "Mitigation failed; detection already recorded",
                    &AuditContext::new()
                        .field("attack", report.kind.label())
                        .field("reason", reason),
                ),
            }
        }
    }

    /// Sybil: penalize every cluster member, then ask the consensus layer
    /// for stronger identity proofs (fire-and-forget).
    async fn mitigate_sybil(&self, report: &AttackReport) -> Result<MitigationAction, String> {
        let delta = self.config.policy.sybil_penalty;
        {
            let mut reputation = self.state.reputation.write();
            for node in &report.affected_nodes {
                reputation.adjust(node, delta);
            }
        }

        self.transport
            .request_identity_verification(&report.affected_nodes)
            .await?;

        Ok(MitigationAction::ReputationPenalty {
            delta,
            nodes: report.affected_nodes.clone(),
        })
    }

    /// Eclipse: this node is the victim, so no reputation changes. Rebuild
    /// connections towards a fingerprint-diverse set of high-reputation
    /// peers and announce liveness.
    async fn mitigate_eclipse(&self) -> Result<MitigationAction, String> {
        let target_peers = self.select_reconnect_peers();

        self.transport
            .establish_honest_connections(&target_peers)
            .await?;

        let local = self.state.local_node_id.read().unwrap_or_default();
        self.transport.broadcast_node_status(local).await?;

        Ok(MitigationAction::ConnectionsRebuilt { target_peers })
    }

    /// DoS: throttle first, filter second; the small reputation penalty
    /// only matters if the offense keeps repeating.
    async fn mitigate_dos(&self, report: &AttackReport) -> Result<MitigationAction, String> {
        let node = *report
            .affected_nodes
            .first()
            .ok_or("dos report names no offender")?;

        self.transport.apply_rate_limit(node).await?;
        self.transport.filter_node_messages(node).await?;

        self.state
            .reputation
            .write()
            .adjust(&node, self.config.policy.dos_penalty);

        Ok(MitigationAction::RateLimited { node })
    }

    /// Byzantine: isolate every contradicting node, restart the round with
    /// whoever is left, and record the completed mitigation.
    async fn mitigate_byzantine(
        &self,
        report: &AttackReport,
        contradictions: &[Contradiction],
    ) -> Result<MitigationAction, String> {
        let offenders: BTreeSet<NodeId> =
            contradictions.iter().map(|c| c.node_id).collect();

        let mut isolated = Vec::new();
        for node in &offenders {
            let removed = {
                let mut participants = self.state.participants.write();
                let mut reputation = self.state.reputation.write();
                reputation.forget(node);
                participants.remove(node)
            };
            if removed.is_some() {
                isolated.push(*node);
                if let Err(reason) = self
                    .notifier
                    .notify(SecurityBusEvent::ParticipantRemoved { node_id: *node })
                    .await
                {
                    self.audit.warn(
                        "Failed to publish isolation notification",
                        &AuditContext::new().field("reason", reason),
                    );
                }
            }
        }
        self.state.metrics.record_isolated(isolated.len() as u64);

        let remaining = self.state.participants.read().node_ids();
        self.transport.restart_consensus_round(&remaining).await?;

        let action = MitigationAction::Isolated {
            nodes: isolated.clone(),
        };
        let event = SecurityEvent::new(
            self.time_source.now(),
            report.severity,
            None,
            SecurityEventKind::ThreatMitigated {
                attack: report.kind.label().to_string(),
                action: action.clone(),
            },
        );
        self.state.events.write().append(event.clone());
        if let Err(reason) = self
            .notifier
            .notify(SecurityBusEvent::ThreatMitigated(event))
            .await
        {
            self.audit.warn(
                "Failed to publish mitigation notification",
                &AuditContext::new().field("reason", reason),
            );
        }

        self.maybe_rotate_after_byzantine().await;

        Ok(action)
    }

    /// Pick reconnect targets: reputation above the honesty threshold,
    /// at most one peer per network fingerprint, best scores first.
    fn select_reconnect_peers(&self) -> Vec<NodeId> {
        let participants = self.state.participants.read();
        let reputation = self.state.reputation.read();

        let mut candidates: Vec<_> = participants
            .iter()
            .map(|p| (p, reputation.get(&p.node_id)))
            .filter(|(_, score)| *score > self.config.thresholds.honesty_threshold)
            .collect();
        candidates
            .sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let mut seen_fingerprints = Vec::new();
        let mut targets = Vec::new();
        for (participant, _) in candidates {
            if targets.len() >= self.config.policy.eclipse_target_peers {
                break;
            }
            if seen_fingerprints.contains(&participant.fingerprint) {
                continue;
            }
            seen_fingerprints.push(participant.fingerprint.clone());
            targets.push(participant.node_id);
        }
        targets
    }

    /// Policy trigger: rotate keys after the configured number of
    /// Byzantine detections. A failed rotation is logged; the counter has
    /// already reset, so the next detections build towards a fresh attempt.
    async fn maybe_rotate_after_byzantine(&self) {
        let threshold = self.config.byzantine_rotation_threshold;
        if threshold == 0 {
            return;
        }
        let seen = self
            .state
            .byzantine_since_rotation
            .fetch_add(1, Ordering::SeqCst)
            + 1;
        if seen < threshold {
            return;
        }
        self.state.byzantine_since_rotation.store(0, Ordering::SeqCst);

        match self.rotate_keys_internal().await {
            Ok(epoch) => self.audit.info(
                "Policy-triggered key rotation completed",
                &AuditContext::new().field("new_epoch", format!("{:02x?}", &epoch.0[..4])),
            ),
            Err(error) => self.audit.error(
                "Policy-triggered key rotation failed",
                &AuditContext::new().field("reason", error.to_string()),
            ),
        }
    }
}
