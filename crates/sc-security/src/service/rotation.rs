//! Key rotation protocol
//!
//! Invariant: at every observable instant exactly one key epoch is active.
//! The write half of the key-state lock is held across the whole
//! re-encryption sweep, so a concurrent signature request either runs
//! fully before the rotation or fully after the cutover, never against
//! half-rotated state. Any failure before cutover leaves the old epoch
//! active and surfaces as an error; a started rotation is never silently
//! retried or abandoned partway by shutdown.

use std::time::Instant;

use shared_bus::SecurityBusEvent;
use shared_types::{KeyEpochId, SecurityEvent, SecurityEventKind, Severity};

use crate::domain::{RotationStage, SecurityError, SecurityResult};
use crate::ports::outbound::KeyVault;
use crate::ports::{
    AuditContext, AuditSink, ConsensusMonitor, SecurityNotifier, ThresholdCryptoService,
    TransportControl,
};

use super::SecurityOrchestrator;

impl<C, M, T, A, V, N> SecurityOrchestrator<C, M, T, A, V, N>
where
    C: ThresholdCryptoService,
    M: ConsensusMonitor,
    T: TransportControl,
    A: AuditSink,
    V: KeyVault,
    N: SecurityNotifier,
{
    pub(crate) async fn rotate_keys_internal(&self) -> SecurityResult<KeyEpochId> {
        if !self.state.is_initialized() {
            return Err(SecurityError::NotInitialized);
        }
        let started = Instant::now();

        // Exclusive for the entire sweep; signature requests queue on the
        // read half until cutover or abort
        let mut key_state = self.state.key_state.write().await;
        let old_key = key_state.active.ok_or(SecurityError::NoActiveKey)?;

        // 1. New distributed key set scoped to the current participant set
        let participants = self.state.participants.read().node_ids();
        let new_set = self
            .crypto
            .rotate_keys(old_key, &participants)
            .await
            .map_err(|reason| SecurityError::RotationFailed {
                stage: RotationStage::KeyGeneration,
                reason,
            })?;

        // 2. Full re-encryption sweep. Not lazy: every entry is resealed
        // before the new key becomes visible, and the first failure aborts
        // with the old key still active.
        let entries = self
            .vault
            .entry_ids()
            .await
            .map_err(|reason| SecurityError::RotationFailed {
                stage: RotationStage::ReencryptionSweep,
                reason,
            })?;
        for entry_id in &entries {
            self.vault
                .reseal(entry_id, old_key, new_set.epoch)
                .await
                .map_err(|reason| SecurityError::RotationFailed {
                    stage: RotationStage::ReencryptionSweep,
                    reason: format!("entry {entry_id}: {reason}"),
                })?;
        }

        // 3. Cutover: point the signature system at the new key, then swap
        // the active epoch. Only now does the rotation become observable.
        self.crypto
            .update_keys(&new_set)
            .await
            .map_err(|reason| SecurityError::RotationFailed {
                stage: RotationStage::Cutover,
                reason,
            })?;
        key_state.active = Some(new_set.epoch);
        key_state.archived.push(old_key);
        drop(key_state);

        // 4. Audit trail
        let event = SecurityEvent::new(
            self.time_source.now(),
            Severity::Medium,
            None,
            SecurityEventKind::KeyRotation {
                old_key,
                new_key: new_set.epoch,
            },
        );
        self.state.events.write().append(event.clone());
        if let Err(reason) = self.notifier.notify(SecurityBusEvent::KeyRotated(event)).await {
            self.audit.warn(
                "Failed to publish rotation notification",
                &AuditContext::new().field("reason", reason),
            );
        }

        let latency_ms = started.elapsed().as_millis() as u64;
        self.state.metrics.record_rotation(latency_ms);
        self.audit.info(
            "Key rotation completed",
            &AuditContext::new()
                .field("resealed_entries", entries.len())
                .field("latency_ms", latency_ms),
        );

        Ok(new_set.epoch)
    }
}
