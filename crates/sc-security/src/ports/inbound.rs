//! Driving ports (Inbound API)

use std::collections::HashMap;

use async_trait::async_trait;
use shared_types::{
    DiscreteLogProof, KeyEpochId, NodeId, Participant, SecurityEvent, SecurityMetrics,
    ThresholdSignature,
};

use crate::domain::{ObservedMessage, SecurityResult};

/// Primary security API, consumed by the surrounding protocol and API
/// layers.
#[async_trait]
pub trait SecurityApi: Send + Sync {
    /// Bring the orchestrator online.
    ///
    /// Generates this node's identity key pair, runs distributed key
    /// generation, stores this node's key share, seeds reputation at
    /// neutral for all current participants, configures the consensus
    /// monitor, and starts the monitoring loop.
    ///
    /// # Errors
    ///
    /// Key generation or share storage failure is fatal: the error
    /// propagates, nothing is retried, and no partial orchestrator is left
    /// running.
    async fn initialize(&self) -> SecurityResult<()>;

    /// Stop the monitoring loop, wait a bounded grace period for in-flight
    /// work, release cryptographic resources, and flush the audit sink.
    ///
    /// An in-flight key rotation is waited for, never cancelled.
    async fn shutdown(&self) -> SecurityResult<()>;

    /// Admit a participant, or overwrite its static metadata if already
    /// present. An existing reputation score is never reset by re-adding.
    async fn add_participant(&self, participant: Participant) -> SecurityResult<()>;

    /// Remove a participant along with its reputation score. Removing an
    /// absent id is a no-op.
    async fn remove_participant(&self, node_id: NodeId) -> SecurityResult<()>;

    /// Create a threshold signature over `message` with the given
    /// signatories, under the active key epoch.
    async fn create_threshold_signature(
        &self,
        message: &[u8],
        signatories: &[NodeId],
    ) -> SecurityResult<ThresholdSignature>;

    /// Verify a threshold signature.
    ///
    /// A cryptographic mismatch returns `Ok(false)`; only a service
    /// failure returns an error.
    async fn verify_threshold_signature(
        &self,
        message: &[u8],
        signature: &ThresholdSignature,
    ) -> SecurityResult<bool>;

    /// Create a zero-knowledge proof of discrete-log knowledge.
    async fn create_zero_knowledge_proof(
        &self,
        secret: &[u8],
        commitment: &[u8],
        challenge: Option<&[u8]>,
    ) -> SecurityResult<DiscreteLogProof>;

    /// Verify a zero-knowledge proof. Same error contract as signature
    /// verification.
    async fn verify_zero_knowledge_proof(
        &self,
        proof: &DiscreteLogProof,
        public_key: &[u8],
    ) -> SecurityResult<bool>;

    /// Run the key rotation protocol and return the new active epoch.
    ///
    /// Atomicity: any failure before cutover leaves the old epoch active
    /// and is reported as an error; no partial rotation is ever observable.
    async fn rotate_keys(&self) -> SecurityResult<KeyEpochId>;

    /// Record the outcome of a consensus round. Failures append a
    /// `ConsensusFailure` event.
    async fn record_consensus_outcome(
        &self,
        success: bool,
        reason: Option<String>,
    ) -> SecurityResult<()>;

    /// Feed per-node message rates from the transport layer into the next
    /// monitoring snapshot.
    async fn ingest_traffic_sample(&self, rates: HashMap<NodeId, u32>);

    /// Feed observed consensus messages into the next monitoring snapshot.
    async fn ingest_consensus_messages(&self, messages: Vec<ObservedMessage>);

    /// Metrics snapshot. Never blocks on the monitoring loop.
    async fn get_metrics(&self) -> SecurityMetrics;

    /// The most recent `limit` security events (all, when `None`).
    async fn get_security_events(&self, limit: Option<usize>) -> Vec<SecurityEvent>;

    /// Current reputation scores, keyed by node id.
    async fn get_reputation_scores(&self) -> HashMap<NodeId, f64>;

    /// The currently active key epoch, if initialized.
    async fn active_key_epoch(&self) -> Option<KeyEpochId>;
}
