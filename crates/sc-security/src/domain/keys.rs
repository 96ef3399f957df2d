//! Key-lifecycle types exchanged with the cryptographic-primitives service.

use serde::{Deserialize, Serialize};
use shared_types::KeyEpochId;

/// Elliptic curve requested for distributed key generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    Secp256k1,
    Bls12_381,
}

/// One generation of distributed key material, as returned by the
/// cryptographic service.
///
/// The private share passes through the orchestrator exactly once, on its
/// way to `store_key_share`; it is never retained here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributedKeySet {
    /// Aggregate public key for signature verification.
    pub master_public_key: Vec<u8>,
    /// This node's public share.
    pub public_key_share: Vec<u8>,
    /// This node's private share (handed straight to share storage).
    pub private_key_share: Vec<u8>,
    /// Epoch identifier derived from the key material's fingerprint.
    pub epoch: KeyEpochId,
}
