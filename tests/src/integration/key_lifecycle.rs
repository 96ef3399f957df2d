//! # Key Lifecycle Scenarios
//!
//! Rotation atomicity under sweep failure at every possible point, and
//! signature requests racing an in-progress rotation.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use sc_security::adapters::{
        InMemoryKeyVault, MemoryAuditSink, MemoryNotifier, NullConsensusMonitor,
        RecordingTransportControl, SoftwareCryptoService,
    };
    use sc_security::ports::{KeyVault, SecurityApi};
    use sc_security::{
        SecurityConfig, SecurityDependencies, SecurityError, SecurityOrchestrator,
    };
    use shared_types::{KeyEpochId, NodeId};

    use crate::{init_tracing, test_participant};

    type LifecycleOrchestrator<V> = SecurityOrchestrator<
        SoftwareCryptoService,
        NullConsensusMonitor,
        RecordingTransportControl,
        MemoryAuditSink,
        V,
        MemoryNotifier,
    >;

    fn quiet_config() -> SecurityConfig {
        let mut config = SecurityConfig::default();
        config.check_interval = Duration::from_secs(3600);
        config.shutdown_grace = Duration::from_millis(100);
        config.thresholds.min_honest_ratio = 0.0;
        config
    }

    fn orchestrator_with_vault<V: KeyVault>(vault: Arc<V>) -> LifecycleOrchestrator<V> {
        SecurityOrchestrator::new(SecurityDependencies {
            crypto: Arc::new(SoftwareCryptoService::with_seed(0xBEEF)),
            monitor: Arc::new(NullConsensusMonitor::new()),
            transport: Arc::new(RecordingTransportControl::new()),
            audit: Arc::new(MemoryAuditSink::new()),
            vault,
            notifier: Arc::new(MemoryNotifier::new()),
            config: quiet_config(),
        })
        .with_participants((1..=3).map(test_participant).collect())
    }

    /// Vault wrapper that slows every reseal, widening the rotation window
    /// so concurrent requests genuinely race the sweep.
    struct SlowVault {
        inner: InMemoryKeyVault,
        delay: Duration,
    }

    #[async_trait]
    impl KeyVault for SlowVault {
        async fn entry_ids(&self) -> Result<Vec<String>, String> {
            self.inner.entry_ids().await
        }

        async fn store(
            &self,
            entry_id: &str,
            plaintext: &[u8],
            epoch: KeyEpochId,
        ) -> Result<(), String> {
            self.inner.store(entry_id, plaintext, epoch).await
        }

        async fn open(&self, entry_id: &str, epoch: KeyEpochId) -> Result<Vec<u8>, String> {
            self.inner.open(entry_id, epoch).await
        }

        async fn reseal(
            &self,
            entry_id: &str,
            old_epoch: KeyEpochId,
            new_epoch: KeyEpochId,
        ) -> Result<(), String> {
            tokio::time::sleep(self.delay).await;
            self.inner.reseal(entry_id, old_epoch, new_epoch).await
        }
    }

    #[tokio::test]
    async fn test_sweep_failure_at_every_point_keeps_old_epoch() {
        init_tracing();
        const ENTRIES: u64 = 4;

        for failing_at in 0..ENTRIES {
            let vault = Arc::new(InMemoryKeyVault::failing_after_reseals(failing_at));
            let orchestrator = orchestrator_with_vault(Arc::clone(&vault));
            orchestrator.initialize().await.unwrap();
            let old_epoch = orchestrator.active_key_epoch().await.unwrap();

            for i in 0..ENTRIES {
                vault
                    .store(&format!("entry-{i}"), b"sealed config", old_epoch)
                    .await
                    .unwrap();
            }

            let result = orchestrator.rotate_keys().await;
            assert!(
                matches!(result, Err(SecurityError::RotationFailed { .. })),
                "sweep failing at entry {failing_at} must abort the rotation"
            );

            // The pre-rotation epoch is still the one and only active key
            assert_eq!(orchestrator.active_key_epoch().await, Some(old_epoch));
            assert_eq!(orchestrator.get_metrics().await.key_rotations, 0);

            // Every entry still opens under the old epoch
            for i in 0..ENTRIES {
                assert_eq!(
                    vault.open(&format!("entry-{i}"), old_epoch).await.unwrap(),
                    b"sealed config"
                );
            }

            orchestrator.shutdown().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_successful_rotation_is_complete() {
        init_tracing();
        let vault = Arc::new(InMemoryKeyVault::new());
        let orchestrator = orchestrator_with_vault(Arc::clone(&vault));
        orchestrator.initialize().await.unwrap();
        let old_epoch = orchestrator.active_key_epoch().await.unwrap();

        for i in 0..8 {
            vault
                .store(&format!("cfg-{i}"), format!("value-{i}").as_bytes(), old_epoch)
                .await
                .unwrap();
        }

        let new_epoch = orchestrator.rotate_keys().await.unwrap();
        assert_ne!(new_epoch, old_epoch);

        // Full sweep, not lazy: every entry already opens under the new key
        for i in 0..8 {
            assert_eq!(
                vault.open(&format!("cfg-{i}"), new_epoch).await.unwrap(),
                format!("value-{i}").as_bytes()
            );
        }

        // New signatures are bound to the new epoch
        let signatories: Vec<NodeId> = (1..=2).map(|b| NodeId::new([b; 32])).collect();
        let signature = orchestrator
            .create_threshold_signature(b"post-rotation", &signatories)
            .await
            .unwrap();
        assert_eq!(signature.epoch, new_epoch);

        orchestrator.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signatures_never_see_torn_key_state() {
        init_tracing();
        let vault = Arc::new(SlowVault {
            inner: InMemoryKeyVault::new(),
            delay: Duration::from_millis(2),
        });
        let orchestrator = Arc::new(orchestrator_with_vault(Arc::clone(&vault)));
        orchestrator.initialize().await.unwrap();
        let old_epoch = orchestrator.active_key_epoch().await.unwrap();

        // A wide sweep: 50 entries at 2ms each keeps the write lock held
        // for ~100ms
        for i in 0..50 {
            vault
                .store(&format!("e{i}"), b"v", old_epoch)
                .await
                .unwrap();
        }

        let rotator = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.rotate_keys().await })
        };

        // Fire signature requests throughout the rotation window
        let mut signers = Vec::new();
        for i in 0..20u64 {
            let orchestrator = Arc::clone(&orchestrator);
            signers.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(i * 7)).await;
                let message = format!("payload-{i}");
                let signatories: Vec<NodeId> =
                    (1..=2).map(|b| NodeId::new([b; 32])).collect();
                let signature = orchestrator
                    .create_threshold_signature(message.as_bytes(), &signatories)
                    .await
                    .unwrap();
                let valid = orchestrator
                    .verify_threshold_signature(message.as_bytes(), &signature)
                    .await
                    .unwrap();
                (signature, valid)
            }));
        }

        let new_epoch = rotator.await.unwrap().unwrap();
        assert_ne!(new_epoch, old_epoch);

        for signer in signers {
            let (signature, valid) = signer.await.unwrap();
            // Every signature was made wholly before or wholly after the
            // cutover, and always verifies against its own epoch
            assert!(valid);
            assert!(
                signature.epoch == old_epoch || signature.epoch == new_epoch,
                "signature bound to an epoch that was never active"
            );
        }

        orchestrator.shutdown().await.unwrap();
    }
}
