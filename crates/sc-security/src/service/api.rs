//! `SecurityApi` implementation: lifecycle, membership, on-demand
//! cryptographic operations, and read-only snapshots.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Instant;

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use rand::RngCore;
use sha3::{Digest, Sha3_256};
use shared_bus::SecurityBusEvent;
use shared_types::{
    DiscreteLogProof, KeyEpochId, NodeId, Participant, SecurityEvent, SecurityEventKind,
    SecurityMetrics, Severity, ThresholdSignature,
};

use crate::domain::{ObservedMessage, SecurityError, SecurityResult};
use crate::ports::outbound::KeyVault;
use crate::ports::{
    AuditContext, AuditSink, ConsensusMonitor, SecurityApi, SecurityNotifier,
    ThresholdCryptoService, TransportControl,
};

use super::SecurityOrchestrator;

#[async_trait]
impl<C, M, T, A, V, N> SecurityApi for SecurityOrchestrator<C, M, T, A, V, N>
where
    C: ThresholdCryptoService + 'static,
    M: ConsensusMonitor + 'static,
    T: TransportControl + 'static,
    A: AuditSink + 'static,
    V: KeyVault + 'static,
    N: SecurityNotifier + 'static,
{
    async fn initialize(&self) -> SecurityResult<()> {
        if self.state.is_initialized() {
            return Err(SecurityError::AlreadyInitialized);
        }

        // Node identity key pair: identifies this node to its peers, never
        // used for consensus signing
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        let identity_key = SigningKey::from_bytes(&seed);
        let node_id = {
            let digest: [u8; 32] =
                Sha3_256::digest(identity_key.verifying_key().as_bytes()).into();
            NodeId::new(digest)
        };
        *self.state.local_node_id.write() = Some(node_id);
        *self.state.identity_key.write() = Some(identity_key);

        // Distributed key generation; failure here is fatal and not retried
        let node_ids = self.state.participants.read().node_ids();
        let total_parties = node_ids.len().max(1);
        let threshold = self.config.signature_threshold.clamp(1, total_parties);
        let key_set = self
            .crypto
            .generate_distributed_keys(threshold, total_parties, self.config.curve)
            .await
            .map_err(SecurityError::KeyGenerationFailed)?;

        self.crypto
            .store_key_share(&key_set.private_key_share, node_id)
            .await
            .map_err(SecurityError::KeyShareStorageFailed)?;

        self.crypto
            .update_keys(&key_set)
            .await
            .map_err(SecurityError::KeyGenerationFailed)?;
        self.state.key_state.write().await.active = Some(key_set.epoch);

        // Every configured participant starts at neutral trust
        self.state.reputation.write().initialize(&node_ids);

        if let Err(reason) = self.monitor.configure(&self.config.thresholds).await {
            self.audit.warn(
                "Consensus monitor rejected threshold configuration",
                &AuditContext::new().field("reason", reason),
            );
        }

        self.state.initialized.store(true, Ordering::SeqCst);
        self.state.running.store(true, Ordering::SeqCst);
        let monitor_task = tokio::spawn(self.clone().monitor_loop());
        *self.state.monitor_handle.lock() = Some(monitor_task);

        if let Err(reason) = self
            .notifier
            .notify(SecurityBusEvent::Initialized { node_id })
            .await
        {
            self.audit.warn(
                "Failed to publish initialization notification",
                &AuditContext::new().field("reason", reason),
            );
        }
        self.audit.info(
            "Security orchestrator initialized",
            &AuditContext::new()
                .field("participants", node_ids.len())
                .field("signature_threshold", threshold),
        );
        Ok(())
    }

    async fn shutdown(&self) -> SecurityResult<()> {
        // Stop the scheduler first: no new tick starts after this
        self.state.running.store(false, Ordering::SeqCst);

        let handle = self.state.monitor_handle.lock().take();
        if let Some(mut handle) = handle {
            // Bounded grace for an in-flight tick, then abort it
            if tokio::time::timeout(self.config.shutdown_grace, &mut handle)
                .await
                .is_err()
            {
                handle.abort();
            }
        }

        // An in-flight rotation is waited for, never cancelled
        drop(self.state.key_state.write().await);

        if let Err(reason) = self.crypto.cleanup().await {
            self.audit.warn(
                "Cryptographic service cleanup failed",
                &AuditContext::new().field("reason", reason),
            );
        }

        self.audit.info("Security orchestrator stopped", &AuditContext::new());
        self.audit.flush();
        self.state.initialized.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn add_participant(&self, participant: Participant) -> SecurityResult<()> {
        let node_id = participant.node_id;
        {
            let mut participants = self.state.participants.write();
            let mut reputation = self.state.reputation.write();
            // admit() keeps an existing score: re-adding overwrites
            // metadata only
            reputation.admit(node_id);
            participants.insert(participant);
        }

        if let Err(reason) = self
            .notifier
            .notify(SecurityBusEvent::ParticipantAdded { node_id })
            .await
        {
            return Err(SecurityError::Notifier(reason));
        }
        Ok(())
    }

    async fn remove_participant(&self, node_id: NodeId) -> SecurityResult<()> {
        let removed = {
            let mut participants = self.state.participants.write();
            let mut reputation = self.state.reputation.write();
            reputation.forget(&node_id);
            participants.remove(&node_id)
        };

        if removed.is_some() {
            if let Err(reason) = self
                .notifier
                .notify(SecurityBusEvent::ParticipantRemoved { node_id })
                .await
            {
                return Err(SecurityError::Notifier(reason));
            }
        }
        Ok(())
    }

    async fn create_threshold_signature(
        &self,
        message: &[u8],
        signatories: &[NodeId],
    ) -> SecurityResult<ThresholdSignature> {
        if !self.state.is_initialized() {
            return Err(SecurityError::NotInitialized);
        }
        let started = Instant::now();

        // Shared read of key state: signature requests queue behind an
        // in-progress rotation sweep instead of seeing a half-rotated key
        let key_state = self.state.key_state.read().await;
        key_state.active.ok_or(SecurityError::NoActiveKey)?;
        let result = self
            .crypto
            .create_threshold_signature(message, signatories)
            .await;
        drop(key_state);

        let signature = result.map_err(SecurityError::CryptoService)?;
        self.state
            .metrics
            .record_signature_latency(started.elapsed().as_millis() as u64);
        Ok(signature)
    }

    async fn verify_threshold_signature(
        &self,
        message: &[u8],
        signature: &ThresholdSignature,
    ) -> SecurityResult<bool> {
        if !self.state.is_initialized() {
            return Err(SecurityError::NotInitialized);
        }
        // A mismatch comes back as Ok(false); only a service failure is an
        // error
        self.crypto
            .verify_threshold_signature(message, signature)
            .await
            .map_err(SecurityError::CryptoService)
    }

    async fn create_zero_knowledge_proof(
        &self,
        secret: &[u8],
        commitment: &[u8],
        challenge: Option<&[u8]>,
    ) -> SecurityResult<DiscreteLogProof> {
        if !self.state.is_initialized() {
            return Err(SecurityError::NotInitialized);
        }
        let started = Instant::now();
        let proof = self
            .crypto
            .prove_discrete_log(secret, commitment, challenge)
            .await
            .map_err(SecurityError::CryptoService)?;
        self.state
            .metrics
            .record_proof_latency(started.elapsed().as_millis() as u64);
        Ok(proof)
    }

    async fn verify_zero_knowledge_proof(
        &self,
        proof: &DiscreteLogProof,
        public_key: &[u8],
    ) -> SecurityResult<bool> {
        if !self.state.is_initialized() {
            return Err(SecurityError::NotInitialized);
        }
        self.crypto
            .verify_discrete_log_proof(proof, public_key)
            .await
            .map_err(SecurityError::CryptoService)
    }

    async fn rotate_keys(&self) -> SecurityResult<KeyEpochId> {
        self.rotate_keys_internal().await
    }

    async fn record_consensus_outcome(
        &self,
        success: bool,
        reason: Option<String>,
    ) -> SecurityResult<()> {
        self.state.metrics.record_consensus_outcome(success);
        if success {
            return Ok(());
        }

        let event = SecurityEvent::new(
            self.time_source.now(),
            Severity::High,
            None,
            SecurityEventKind::ConsensusFailure {
                reason: reason.unwrap_or_else(|| "unspecified".to_string()),
            },
        );
        self.state.events.write().append(event.clone());
        self.notifier
            .notify(SecurityBusEvent::ConsensusFailure(event))
            .await
            .map_err(SecurityError::Notifier)
    }

    async fn ingest_traffic_sample(&self, rates: HashMap<NodeId, u32>) {
        *self.state.traffic.write() = rates;
    }

    async fn ingest_consensus_messages(&self, messages: Vec<ObservedMessage>) {
        let mut buffer = self.state.message_buffer.write();
        buffer.extend(messages);
        // Oldest messages fall off when the buffer overflows between ticks
        let overflow = buffer.len().saturating_sub(self.config.message_buffer_limit);
        if overflow > 0 {
            buffer.drain(..overflow);
        }
    }

    async fn get_metrics(&self) -> SecurityMetrics {
        self.state.metrics.snapshot()
    }

    async fn get_security_events(&self, limit: Option<usize>) -> Vec<SecurityEvent> {
        self.state.events.read().recent(limit)
    }

    async fn get_reputation_scores(&self) -> HashMap<NodeId, f64> {
        self.state.reputation.read().snapshot()
    }

    async fn active_key_epoch(&self) -> Option<KeyEpochId> {
        self.state.key_state.read().await.active
    }
}
