//! Driven ports (Outbound dependencies)
//!
//! Every port here is an asynchronous boundary: calls may suspend while
//! the external service works. Port errors are plain strings at this seam;
//! the service translates them into the `SecurityError` taxonomy.

use async_trait::async_trait;
use shared_bus::SecurityBusEvent;
use shared_types::{
    AttackReport, DiscreteLogProof, KeyEpochId, NodeId, ThresholdSignature, Timestamp,
};

use crate::domain::{CurveKind, DetectorThresholds, DistributedKeySet, SecuritySnapshot};

/// The cryptographic-primitives service.
///
/// The mathematics (curve operations, polynomial secret sharing) live
/// behind this contract; the orchestrator only coordinates calls and
/// never holds key material beyond handing a share to storage.
#[async_trait]
pub trait ThresholdCryptoService: Send + Sync {
    /// Run distributed key generation for `total_parties` with signing
    /// threshold `threshold`.
    async fn generate_distributed_keys(
        &self,
        threshold: usize,
        total_parties: usize,
        curve: CurveKind,
    ) -> Result<DistributedKeySet, String>;

    /// Create a threshold signature with the active key.
    async fn create_threshold_signature(
        &self,
        message: &[u8],
        signatories: &[NodeId],
    ) -> Result<ThresholdSignature, String>;

    /// Verify a threshold signature. `Ok(false)` is a cryptographic
    /// mismatch; `Err` means the service could not run.
    async fn verify_threshold_signature(
        &self,
        message: &[u8],
        signature: &ThresholdSignature,
    ) -> Result<bool, String>;

    /// Switch the service's active key to `key_set`.
    async fn update_keys(&self, key_set: &DistributedKeySet) -> Result<(), String>;

    /// Prove knowledge of the discrete log of `commitment`.
    async fn prove_discrete_log(
        &self,
        secret: &[u8],
        commitment: &[u8],
        challenge: Option<&[u8]>,
    ) -> Result<DiscreteLogProof, String>;

    /// Verify a discrete-log proof against a public key.
    async fn verify_discrete_log_proof(
        &self,
        proof: &DiscreteLogProof,
        public_key: &[u8],
    ) -> Result<bool, String>;

    /// Persist this node's key share.
    async fn store_key_share(&self, share: &[u8], owner: NodeId) -> Result<(), String>;

    /// Generate a replacement key set scoped to `participants`, leaving
    /// the old key active until `update_keys`.
    async fn rotate_keys(
        &self,
        old_key: KeyEpochId,
        participants: &[NodeId],
    ) -> Result<DistributedKeySet, String>;

    /// Release service resources.
    async fn cleanup(&self) -> Result<(), String>;
}

/// The external consensus security monitor (Byzantine oracle).
///
/// Opaque from this subsystem's perspective: we supply the snapshot and
/// route whatever reports come back to mitigation.
#[async_trait]
pub trait ConsensusMonitor: Send + Sync {
    /// Push detector thresholds to the monitor.
    async fn configure(&self, thresholds: &DetectorThresholds) -> Result<(), String>;

    /// Analyze the snapshot's participants and recent consensus messages
    /// for Byzantine behavior.
    async fn detect_byzantine_attacks(
        &self,
        snapshot: &SecuritySnapshot,
    ) -> Result<Vec<AttackReport>, String>;
}

/// Fire-and-forget notifications into the transport/consensus layer.
///
/// Delivery guarantees are the transport's concern; mitigation logs a
/// failure and moves on.
#[async_trait]
pub trait TransportControl: Send + Sync {
    /// Ask the consensus layer to re-verify the identities of `nodes`.
    async fn request_identity_verification(&self, nodes: &[NodeId]) -> Result<(), String>;

    /// Rebuild connections towards the given high-reputation peers.
    async fn establish_honest_connections(&self, peers: &[NodeId]) -> Result<(), String>;

    /// Broadcast this node's liveness/status.
    async fn broadcast_node_status(&self, node_id: NodeId) -> Result<(), String>;

    /// Throttle traffic from `node`.
    async fn apply_rate_limit(&self, node: NodeId) -> Result<(), String>;

    /// Drop further messages from `node`.
    async fn filter_node_messages(&self, node: NodeId) -> Result<(), String>;

    /// Restart the current consensus round with the remaining participants.
    async fn restart_consensus_round(&self, remaining: &[NodeId]) -> Result<(), String>;
}

/// Structured audit/logging sink.
///
/// This subsystem never formats human-readable log lines itself; it hands
/// a message plus structured context to the sink.
pub trait AuditSink: Send + Sync {
    fn info(&self, message: &str, context: &AuditContext);
    fn warn(&self, message: &str, context: &AuditContext);
    fn error(&self, message: &str, context: &AuditContext);

    /// Flush pending writes (called during shutdown).
    fn flush(&self);
}

/// Key-value context attached to audit records.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    fields: Vec<(&'static str, String)>,
}

impl AuditContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one field.
    pub fn field(mut self, key: &'static str, value: impl ToString) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    /// All attached fields in insertion order.
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }
}

impl std::fmt::Display for AuditContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Sealed storage swept during key rotation.
///
/// Every entry is encrypted under some key epoch; `reseal` re-encrypts one
/// entry from the old epoch to the new without exposing plaintext to the
/// caller. Ciphertext under the old epoch must survive until the rotation
/// commits, so an aborted sweep loses nothing.
#[async_trait]
pub trait KeyVault: Send + Sync {
    /// Ids of every sealed entry.
    async fn entry_ids(&self) -> Result<Vec<String>, String>;

    /// Seal a value under `epoch`.
    async fn store(&self, entry_id: &str, plaintext: &[u8], epoch: KeyEpochId)
        -> Result<(), String>;

    /// Open a value sealed under `epoch`.
    async fn open(&self, entry_id: &str, epoch: KeyEpochId) -> Result<Vec<u8>, String>;

    /// Re-encrypt one entry from `old_epoch` to `new_epoch`.
    async fn reseal(
        &self,
        entry_id: &str,
        old_epoch: KeyEpochId,
        new_epoch: KeyEpochId,
    ) -> Result<(), String>;
}

/// Publisher for the typed notification set.
#[async_trait]
pub trait SecurityNotifier: Send + Sync {
    async fn notify(&self, event: SecurityBusEvent) -> Result<(), String>;
}

/// Time source for timestamping snapshots and events.
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp.
    fn now(&self) -> Timestamp;
}

/// Default time source using system time.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Timestamp::new(secs)
    }
}
