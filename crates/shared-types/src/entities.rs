//! # Core Domain Entities
//!
//! Defines the participant and key-lifecycle entities owned by the security
//! subsystem and referenced by every other layer.
//!
//! ## Clusters
//!
//! - **Identity**: `NodeId`, `PublicKey`, `NetworkFingerprint`
//! - **Membership**: `Participant`
//! - **Key Lifecycle**: `KeyEpochId`, `ThresholdSignature`, `DiscreteLogProof`

use serde::{Deserialize, Serialize};

/// A 32-byte hash (SHA3-256 across this codebase).
pub type Hash = [u8; 32];

/// Unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub [u8; 32]);

impl NodeId {
    /// Construct from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw byte view, e.g. for keying a rate limiter.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Opaque public key material as registered by a participant.
///
/// The security subsystem never interprets this; it is handed through to
/// the cryptographic-primitives service.
pub type PublicKey = Vec<u8>;

/// Seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Construct from unix seconds.
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Unix seconds.
    pub fn as_secs(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// CLUSTER A: IDENTITY & MEMBERSHIP
// =============================================================================

/// Network-location attributes of a participant.
///
/// Genuinely independent nodes rarely share all three attributes; the Sybil
/// detector clusters participants on the full triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkFingerprint {
    /// Announced subnet, e.g. "203.0.113.0/24".
    pub subnet: String,
    /// Autonomous system number of the announcing network.
    pub as_number: u32,
    /// Coarse geographic region, e.g. "eu-west".
    pub region: String,
}

impl NetworkFingerprint {
    /// Construct a fingerprint from its three location attributes.
    pub fn new(subnet: impl Into<String>, as_number: u32, region: impl Into<String>) -> Self {
        Self {
            subnet: subnet.into(),
            as_number,
            region: region.into(),
        }
    }
}

/// A consensus participant as tracked by the security orchestrator.
///
/// `node_id` is the primary key; exactly one entry per id exists in the
/// participant set at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Primary key.
    pub node_id: NodeId,
    /// Opaque key material registered at admission.
    pub public_key: PublicKey,
    /// Network-location attributes used by the Sybil detector.
    pub fingerprint: NetworkFingerprint,
    /// Admission time.
    pub joined_at: Timestamp,
}

// =============================================================================
// CLUSTER B: KEY LIFECYCLE
// =============================================================================

/// Opaque identifier of a distributed key epoch.
///
/// Derived from the key material's fingerprint by the cryptographic
/// service; the orchestrator tracks the id for audit correlation only and
/// never holds key material itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEpochId(pub Hash);

impl KeyEpochId {
    /// Construct from a key-material fingerprint.
    pub fn new(fingerprint: Hash) -> Self {
        Self(fingerprint)
    }
}

/// A threshold signature produced by t-of-n key-share holders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSignature {
    /// Opaque signature bytes from the cryptographic service.
    pub bytes: Vec<u8>,
    /// Epoch of the key that produced this signature.
    pub epoch: KeyEpochId,
}

/// A zero-knowledge proof of discrete-log knowledge.
///
/// Opaque to this subsystem; created and checked by the cryptographic
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteLogProof {
    /// Commitment the proof is bound to.
    pub commitment: Vec<u8>,
    /// Challenge used during proving.
    pub challenge: Vec<u8>,
    /// Prover's response.
    pub response: Vec<u8>,
}
