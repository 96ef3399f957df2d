//! # Software Cryptographic Service
//!
//! Keyed-MAC stand-in for the distributed cryptographic-primitives
//! service, for single-process deployments and tests. Every epoch keeps a
//! 32-byte secret; signatures are HMAC-SHA256 under that secret and
//! discrete-log "public keys" are the SHA3 digest of the secret. A
//! production deployment binds the real MPC service behind the same port.
//!
//! ## Mock vs Production
//!
//! | Concern | This adapter | Production |
//! |---------|--------------|------------|
//! | Signing | HMAC under epoch secret | t-of-n threshold signing |
//! | Proofs  | Hash binding | Schnorr discrete-log proofs |
//! | Shares  | In-memory map | Encrypted share storage |

use std::collections::HashMap;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha2::Sha256;
use sha3::{Digest, Sha3_256};
use shared_types::{DiscreteLogProof, KeyEpochId, NodeId, ThresholdSignature};

use crate::domain::{CurveKind, DistributedKeySet};
use crate::ports::ThresholdCryptoService;

type HmacSha256 = Hmac<Sha256>;

fn hash_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Derive the software-service public key for a discrete-log secret.
///
/// Exposed so callers can verify proofs they did not create themselves.
pub fn derive_dlog_public_key(secret: &[u8]) -> Vec<u8> {
    hash_parts(&[b"dlog-pk", secret]).to_vec()
}

#[derive(Debug)]
struct EpochRecord {
    secret: [u8; 32],
    threshold: usize,
}

#[derive(Debug, Default)]
struct CryptoInner {
    epochs: HashMap<KeyEpochId, EpochRecord>,
    active: Option<KeyEpochId>,
    shares: HashMap<NodeId, Vec<u8>>,
    generation: u64,
}

/// In-process implementation of `ThresholdCryptoService`.
pub struct SoftwareCryptoService {
    inner: RwLock<CryptoInner>,
    rng: Mutex<StdRng>,
}

impl SoftwareCryptoService {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CryptoInner::default()),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: RwLock::new(CryptoInner::default()),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate_set(&self, threshold: usize, total_parties: usize) -> Result<DistributedKeySet, String> {
        if threshold == 0 || threshold > total_parties {
            return Err(format!(
                "invalid threshold {threshold} for {total_parties} parties"
            ));
        }

        let mut secret = [0u8; 32];
        self.rng.lock().fill_bytes(&mut secret);

        let mut inner = self.inner.write();
        inner.generation += 1;
        let generation = inner.generation.to_le_bytes();

        let epoch = KeyEpochId::new(hash_parts(&[b"epoch", &secret, &generation]));
        let set = DistributedKeySet {
            master_public_key: hash_parts(&[b"master", &secret]).to_vec(),
            public_key_share: hash_parts(&[b"pub-share", &secret]).to_vec(),
            private_key_share: hash_parts(&[b"priv-share", &secret]).to_vec(),
            epoch,
        };
        inner.epochs.insert(epoch, EpochRecord { secret, threshold });
        Ok(set)
    }
}

impl Default for SoftwareCryptoService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThresholdCryptoService for SoftwareCryptoService {
    async fn generate_distributed_keys(
        &self,
        threshold: usize,
        total_parties: usize,
        _curve: CurveKind,
    ) -> Result<DistributedKeySet, String> {
        self.generate_set(threshold, total_parties)
    }

    async fn create_threshold_signature(
        &self,
        message: &[u8],
        signatories: &[NodeId],
    ) -> Result<ThresholdSignature, String> {
        let inner = self.inner.read();
        let epoch = inner.active.ok_or("no active key epoch")?;
        let record = inner
            .epochs
            .get(&epoch)
            .ok_or("active epoch has no key material")?;

        if signatories.len() < record.threshold {
            return Err(format!(
                "insufficient signatories: got {}, need {}",
                signatories.len(),
                record.threshold
            ));
        }

        let mut mac = HmacSha256::new_from_slice(&record.secret)
            .map_err(|e| format!("mac init failed: {e}"))?;
        mac.update(message);
        Ok(ThresholdSignature {
            bytes: mac.finalize().into_bytes().to_vec(),
            epoch,
        })
    }

    async fn verify_threshold_signature(
        &self,
        message: &[u8],
        signature: &ThresholdSignature,
    ) -> Result<bool, String> {
        let inner = self.inner.read();
        // A signature under an unknown epoch cannot be valid
        let Some(record) = inner.epochs.get(&signature.epoch) else {
            return Ok(false);
        };

        let mut mac = HmacSha256::new_from_slice(&record.secret)
            .map_err(|e| format!("mac init failed: {e}"))?;
        mac.update(message);
        Ok(mac.verify_slice(&signature.bytes).is_ok())
    }

    async fn update_keys(&self, key_set: &DistributedKeySet) -> Result<(), String> {
        let mut inner = self.inner.write();
        if !inner.epochs.contains_key(&key_set.epoch) {
            return Err("unknown key epoch".into());
        }
        inner.active = Some(key_set.epoch);
        Ok(())
    }

    async fn prove_discrete_log(
        &self,
        secret: &[u8],
        commitment: &[u8],
        challenge: Option<&[u8]>,
    ) -> Result<DiscreteLogProof, String> {
        let public_key = derive_dlog_public_key(secret);
        let challenge = match challenge {
            Some(c) => c.to_vec(),
            None => hash_parts(&[b"challenge", commitment]).to_vec(),
        };
        let response = hash_parts(&[&public_key, commitment, &challenge]).to_vec();
        Ok(DiscreteLogProof {
            commitment: commitment.to_vec(),
            challenge,
            response,
        })
    }

    async fn verify_discrete_log_proof(
        &self,
        proof: &DiscreteLogProof,
        public_key: &[u8],
    ) -> Result<bool, String> {
        let expected = hash_parts(&[public_key, &proof.commitment, &proof.challenge]).to_vec();
        Ok(expected == proof.response)
    }

    async fn store_key_share(&self, share: &[u8], owner: NodeId) -> Result<(), String> {
        self.inner.write().shares.insert(owner, share.to_vec());
        Ok(())
    }

    async fn rotate_keys(
        &self,
        old_key: KeyEpochId,
        participants: &[NodeId],
    ) -> Result<DistributedKeySet, String> {
        let threshold = {
            let inner = self.inner.read();
            if inner.active != Some(old_key) {
                return Err("rotation base is not the active epoch".into());
            }
            inner
                .epochs
                .get(&old_key)
                .map(|r| r.threshold)
                .ok_or("active epoch has no key material")?
        };
        // New material scoped to the current participant set; the old key
        // stays active until update_keys
        self.generate_set(threshold.min(participants.len().max(1)), participants.len().max(1))
    }

    async fn cleanup(&self) -> Result<(), String> {
        let mut inner = self.inner.write();
        *inner = CryptoInner::default();
        Ok(())
    }
}
