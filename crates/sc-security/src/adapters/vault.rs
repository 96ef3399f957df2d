//! # In-Memory Key Vault
//!
//! Sealed storage for configuration values and key shares, keyed by epoch.
//! Sealing is a SHA3 keystream XOR derived from the epoch id; ciphertext
//! for an entry is kept **per epoch**, so an aborted re-encryption sweep
//! leaves every old-epoch ciphertext intact and the rotation can fail
//! without losing anything.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use sha3::{Digest, Sha3_256};
use shared_types::KeyEpochId;

use crate::ports::KeyVault;

fn keystream_block(epoch: KeyEpochId, entry_id: &str, block: u64) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(b"vault-seal");
    hasher.update(epoch.0);
    hasher.update(entry_id.as_bytes());
    hasher.update(block.to_le_bytes());
    hasher.finalize().into()
}

fn seal(epoch: KeyEpochId, entry_id: &str, data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, byte)| {
            let block = keystream_block(epoch, entry_id, (i / 32) as u64);
            byte ^ block[i % 32]
        })
        .collect()
}

// XOR keystream: sealing and opening are the same transform
fn open(epoch: KeyEpochId, entry_id: &str, data: &[u8]) -> Vec<u8> {
    seal(epoch, entry_id, data)
}

/// In-process implementation of `KeyVault`.
pub struct InMemoryKeyVault {
    /// entry id -> (epoch -> ciphertext)
    entries: RwLock<HashMap<String, HashMap<KeyEpochId, Vec<u8>>>>,
    /// Reseals remaining before an injected failure; `u64::MAX` = never.
    reseals_until_failure: AtomicU64,
}

impl InMemoryKeyVault {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reseals_until_failure: AtomicU64::new(u64::MAX),
        }
    }

    /// Testing constructor: the `n+1`-th reseal call fails.
    ///
    /// Used to exercise rotation atomicity with a sweep failing at any
    /// chosen point.
    pub fn failing_after_reseals(n: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reseals_until_failure: AtomicU64::new(n),
        }
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }
}

impl Default for InMemoryKeyVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyVault for InMemoryKeyVault {
    async fn entry_ids(&self) -> Result<Vec<String>, String> {
        let mut ids: Vec<String> = self.entries.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn store(
        &self,
        entry_id: &str,
        plaintext: &[u8],
        epoch: KeyEpochId,
    ) -> Result<(), String> {
        let sealed = seal(epoch, entry_id, plaintext);
        self.entries
            .write()
            .entry(entry_id.to_string())
            .or_default()
            .insert(epoch, sealed);
        Ok(())
    }

    async fn open(&self, entry_id: &str, epoch: KeyEpochId) -> Result<Vec<u8>, String> {
        let entries = self.entries.read();
        let sealed = entries
            .get(entry_id)
            .and_then(|per_epoch| per_epoch.get(&epoch))
            .ok_or_else(|| format!("entry {entry_id} not sealed under requested epoch"))?;
        Ok(open(epoch, entry_id, sealed))
    }

    async fn reseal(
        &self,
        entry_id: &str,
        old_epoch: KeyEpochId,
        new_epoch: KeyEpochId,
    ) -> Result<(), String> {
        // Injected failure point for rotation-atomicity tests
        let remaining = self.reseals_until_failure.load(Ordering::SeqCst);
        if remaining != u64::MAX {
            if remaining == 0 {
                return Err("injected reseal failure".into());
            }
            self.reseals_until_failure.store(remaining - 1, Ordering::SeqCst);
        }

        let plaintext = self.open(entry_id, old_epoch).await?;
        // Old-epoch ciphertext is retained until the rotation commits
        self.store(entry_id, &plaintext, new_epoch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch(b: u8) -> KeyEpochId {
        KeyEpochId::new([b; 32])
    }

    #[tokio::test]
    async fn test_store_open_roundtrip() {
        let vault = InMemoryKeyVault::new();
        vault
            .store("validator-config", b"max_drift=15", epoch(1))
            .await
            .unwrap();

        let plain = vault.open("validator-config", epoch(1)).await.unwrap();
        assert_eq!(plain, b"max_drift=15");
    }

    #[tokio::test]
    async fn test_open_wrong_epoch_is_error() {
        let vault = InMemoryKeyVault::new();
        vault.store("entry", b"data", epoch(1)).await.unwrap();

        assert!(vault.open("entry", epoch(2)).await.is_err());
    }

    #[tokio::test]
    async fn test_ciphertext_differs_from_plaintext() {
        let vault = InMemoryKeyVault::new();
        vault.store("entry", b"sensitive bytes", epoch(1)).await.unwrap();

        let sealed = vault
            .entries
            .read()
            .get("entry")
            .unwrap()
            .get(&epoch(1))
            .unwrap()
            .clone();
        assert_ne!(sealed, b"sensitive bytes".to_vec());
    }

    #[tokio::test]
    async fn test_reseal_preserves_old_ciphertext() {
        let vault = InMemoryKeyVault::new();
        vault.store("entry", b"payload", epoch(1)).await.unwrap();

        vault.reseal("entry", epoch(1), epoch(2)).await.unwrap();

        // Both epochs can open the entry until the old one is retired
        assert_eq!(vault.open("entry", epoch(1)).await.unwrap(), b"payload");
        assert_eq!(vault.open("entry", epoch(2)).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_injected_failure_fires_at_configured_point() {
        let vault = InMemoryKeyVault::failing_after_reseals(2);
        for i in 0..4 {
            vault
                .store(&format!("e{i}"), b"v", epoch(1))
                .await
                .unwrap();
        }

        assert!(vault.reseal("e0", epoch(1), epoch(2)).await.is_ok());
        assert!(vault.reseal("e1", epoch(1), epoch(2)).await.is_ok());
        assert!(vault.reseal("e2", epoch(1), epoch(2)).await.is_err());
    }

    #[tokio::test]
    async fn test_entry_ids_sorted() {
        let vault = InMemoryKeyVault::new();
        vault.store("bravo", b"1", epoch(1)).await.unwrap();
        vault.store("alpha", b"2", epoch(1)).await.unwrap();

        assert_eq!(vault.entry_ids().await.unwrap(), vec!["alpha", "bravo"]);
    }
}
