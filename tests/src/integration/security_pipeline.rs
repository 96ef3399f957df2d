//! # Security Pipeline Scenarios
//!
//! End-to-end flow across the crates: transport signals are ingested,
//! detectors run against a snapshot, mitigation updates trust and
//! membership, and consumers observe everything through the shared bus.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use sc_security::ports::SecurityApi;
    use sc_security::{ObservedMessage, SecurityConfig};
    use shared_bus::{EventFilter, EventTopic, SecurityBusEvent};
    use shared_types::{AttackKind, NodeId, SecurityEventKind, Severity};
    use tokio::time::timeout;

    use crate::{init_tracing, pipeline_orchestrator, test_participant};

    fn node(b: u8) -> NodeId {
        NodeId::new([b; 32])
    }

    /// Manual-tick config: dormant loop, eclipse floor disabled so neutral
    /// scores do not trip it.
    fn manual_config() -> SecurityConfig {
        let mut config = SecurityConfig::default();
        config.check_interval = Duration::from_secs(3600);
        config.shutdown_grace = Duration::from_millis(100);
        config.thresholds.sybil_threshold = 2;
        config.thresholds.dos_threshold = 100;
        config.thresholds.min_honest_ratio = 0.0;
        config
    }

    #[tokio::test]
    async fn test_equivocation_flows_to_isolation_and_bus() {
        init_tracing();
        let (orchestrator, bus) =
            pipeline_orchestrator(manual_config(), (1..=4).map(test_participant).collect());
        let mut attacks = bus.subscribe(EventFilter::topics(vec![EventTopic::Attacks]));
        let mut membership = bus.subscribe(EventFilter::topics(vec![EventTopic::Membership]));

        orchestrator.initialize().await.unwrap();

        // Node 2 signs two different messages in round 9
        orchestrator
            .ingest_consensus_messages(vec![
                ObservedMessage {
                    sender: node(1),
                    message_hash: [0x11; 32],
                    round: 9,
                },
                ObservedMessage {
                    sender: node(2),
                    message_hash: [0x22; 32],
                    round: 9,
                },
                ObservedMessage {
                    sender: node(2),
                    message_hash: [0x33; 32],
                    round: 9,
                },
            ])
            .await;

        orchestrator.perform_security_check().await;

        // The equivocator is gone; everyone else remains
        let scores = orchestrator.get_reputation_scores().await;
        assert!(!scores.contains_key(&node(2)));
        assert_eq!(scores.len(), 3);

        // Audit trail: detection first, then the completed mitigation
        let events = orchestrator.get_security_events(None).await;
        assert_eq!(events.len(), 2);
        match &events[0].kind {
            SecurityEventKind::AttackDetected { report } => {
                assert_eq!(report.severity, Severity::Critical);
                match &report.kind {
                    AttackKind::Byzantine { contradictions } => {
                        assert_eq!(contradictions.len(), 1);
                        assert_eq!(contradictions[0].node_id, node(2));
                    }
                    other => panic!("expected Byzantine, got {other:?}"),
                }
            }
            other => panic!("expected AttackDetected, got {other:?}"),
        }
        assert!(matches!(
            events[1].kind,
            SecurityEventKind::ThreatMitigated { .. }
        ));

        // Bus consumers saw the same story
        let first = timeout(Duration::from_millis(200), attacks.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert!(matches!(first, SecurityBusEvent::AttackDetected(_)));

        let removed = timeout(Duration::from_millis(200), membership.recv())
            .await
            .expect("timeout")
            .expect("event");
        match removed {
            SecurityBusEvent::ParticipantRemoved { node_id } => assert_eq!(node_id, node(2)),
            other => panic!("expected ParticipantRemoved, got {other:?}"),
        }

        orchestrator.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_monitoring_loop_catches_sustained_dos() {
        init_tracing();
        let mut config = manual_config();
        config.check_interval = Duration::from_millis(25);
        let (orchestrator, _bus) =
            pipeline_orchestrator(config, vec![test_participant(1), test_participant(2)]);

        orchestrator.initialize().await.unwrap();

        // Node 1 floods; the sample stays current across ticks
        let mut rates = HashMap::new();
        rates.insert(node(1), 50_000u32);
        rates.insert(node(2), 5u32);
        orchestrator.ingest_traffic_sample(rates).await;

        // Let several ticks elapse without driving checks manually
        tokio::time::sleep(Duration::from_millis(150)).await;
        orchestrator.shutdown().await.unwrap();

        let metrics = orchestrator.get_metrics().await;
        assert!(metrics.dos_attempts >= 1, "loop never ran a tick");

        // Sustained offense feeds back into reputation via repeated reports
        let scores = orchestrator.get_reputation_scores().await;
        assert!(scores[&node(1)] < 0.5);
        assert_eq!(scores[&node(2)], 0.5);
    }

    #[tokio::test]
    async fn test_eclipse_fires_for_starved_node() {
        init_tracing();
        let mut config = manual_config();
        // Default floor restored: everyone at neutral counts as zero
        // honest peers, which is exactly a starved topology
        config.thresholds.min_honest_ratio = 0.3;
        let (orchestrator, bus) =
            pipeline_orchestrator(config, (1..=6).map(test_participant).collect());
        let mut attacks = bus.subscribe(EventFilter::topics(vec![EventTopic::Attacks]));

        orchestrator.initialize().await.unwrap();
        orchestrator.perform_security_check().await;

        let metrics = orchestrator.get_metrics().await;
        assert_eq!(metrics.eclipse_attempts, 1);

        let event = timeout(Duration::from_millis(200), attacks.recv())
            .await
            .expect("timeout")
            .expect("event");
        match event {
            SecurityBusEvent::AttackDetected(event) => {
                assert_eq!(event.severity, Severity::Critical);
            }
            other => panic!("expected AttackDetected, got {other:?}"),
        }

        // The victim's peers keep their scores: eclipse punishes nobody
        let scores = orchestrator.get_reputation_scores().await;
        assert!(scores.values().all(|s| *s == 0.5));

        orchestrator.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_consensus_failure_reaches_bus() {
        init_tracing();
        let (orchestrator, bus) = pipeline_orchestrator(manual_config(), vec![]);
        let mut health = bus.subscribe(EventFilter::topics(vec![EventTopic::ConsensusHealth]));

        orchestrator
            .record_consensus_outcome(false, Some("quorum lost at view 12".into()))
            .await
            .unwrap();

        let event = timeout(Duration::from_millis(200), health.recv())
            .await
            .expect("timeout")
            .expect("event");
        match event {
            SecurityBusEvent::ConsensusFailure(event) => match event.kind {
                SecurityEventKind::ConsensusFailure { ref reason } => {
                    assert_eq!(reason, "quorum lost at view 12");
                }
                ref other => panic!("expected ConsensusFailure kind, got {other:?}"),
            },
            other => panic!("expected ConsensusFailure, got {other:?}"),
        }
    }
}
