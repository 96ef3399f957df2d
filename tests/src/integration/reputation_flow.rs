//! # Reputation Flow Scenarios
//!
//! Trust accounting driven entirely through the public API: detection
//! penalties, membership churn, clamping, and decay.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sc_security::ports::SecurityApi;
    use sc_security::SecurityConfig;
    use shared_types::{NetworkFingerprint, NodeId, Participant, Timestamp};

    use crate::{init_tracing, pipeline_orchestrator};

    fn node(b: u8) -> NodeId {
        NodeId::new([b; 32])
    }

    /// A Sybil cluster: every member shares one network fingerprint.
    fn cluster_member(b: u8) -> Participant {
        Participant {
            node_id: node(b),
            public_key: vec![b],
            fingerprint: NetworkFingerprint::new("203.0.113.0/24", 64512, "eu-west"),
            joined_at: Timestamp::new(1_700_000_000),
        }
    }

    fn manual_config() -> SecurityConfig {
        let mut config = SecurityConfig::default();
        config.check_interval = Duration::from_secs(3600);
        config.shutdown_grace = Duration::from_millis(100);
        config.thresholds.sybil_threshold = 2;
        config.thresholds.min_honest_ratio = 0.0;
        config
    }

    #[tokio::test]
    async fn test_sybil_penalty_survives_metadata_overwrite() {
        init_tracing();
        let (orchestrator, _bus) =
            pipeline_orchestrator(manual_config(), (1..=3).map(cluster_member).collect());
        orchestrator.initialize().await.unwrap();

        orchestrator.perform_security_check().await;
        let scores = orchestrator.get_reputation_scores().await;
        assert!((scores[&node(1)] - 0.2).abs() < 1e-9);

        // Re-adding the node with fresh metadata keeps the earned score
        let mut updated = cluster_member(1);
        updated.public_key = vec![0xFF; 32];
        orchestrator.add_participant(updated).await.unwrap();

        let scores = orchestrator.get_reputation_scores().await;
        assert!((scores[&node(1)] - 0.2).abs() < 1e-9);

        orchestrator.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_repeated_penalties_clamp_at_zero() {
        init_tracing();
        let (orchestrator, _bus) =
            pipeline_orchestrator(manual_config(), (1..=3).map(cluster_member).collect());
        orchestrator.initialize().await.unwrap();

        // Each tick re-detects the cluster; scores bottom out at 0.0
        for _ in 0..5 {
            orchestrator.perform_security_check().await;
        }

        let scores = orchestrator.get_reputation_scores().await;
        for b in 1..=3 {
            assert_eq!(scores[&node(b)], 0.0);
        }

        // One event per detection: evidence is never de-duplicated
        let events = orchestrator.get_security_events(None).await;
        assert_eq!(events.len(), 5);

        orchestrator.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_removed_node_leaves_no_score_behind() {
        init_tracing();
        let (orchestrator, _bus) =
            pipeline_orchestrator(manual_config(), (1..=3).map(cluster_member).collect());
        orchestrator.initialize().await.unwrap();

        orchestrator.remove_participant(node(2)).await.unwrap();

        let scores = orchestrator.get_reputation_scores().await;
        assert!(!scores.contains_key(&node(2)));

        // The remaining pair no longer exceeds the cluster threshold
        orchestrator.perform_security_check().await;
        assert_eq!(orchestrator.get_metrics().await.sybil_attempts, 0);

        orchestrator.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_decay_regresses_penalties_towards_neutral() {
        init_tracing();
        let (orchestrator, _bus) =
            pipeline_orchestrator(manual_config(), (1..=3).map(cluster_member).collect());
        orchestrator.initialize().await.unwrap();

        orchestrator.perform_security_check().await;
        let before = orchestrator.get_reputation_scores().await[&node(1)];
        assert!((before - 0.2).abs() < 1e-9);

        orchestrator.run_reputation_decay();

        let after = orchestrator.get_reputation_scores().await[&node(1)];
        assert!(after > before);
        assert!(after < 0.5);

        orchestrator.shutdown().await.unwrap();
    }
}
