//! Error types for the security subsystem.

use thiserror::Error;

/// Stage at which a key rotation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStage {
    /// Requesting the new distributed key set.
    KeyGeneration,
    /// Re-encrypting vault entries under the new epoch.
    ReencryptionSweep,
    /// Switching the signature system to the new key.
    Cutover,
}

impl std::fmt::Display for RotationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RotationStage::KeyGeneration => "key generation",
            RotationStage::ReencryptionSweep => "re-encryption sweep",
            RotationStage::Cutover => "cutover",
        };
        f.write_str(s)
    }
}

/// Security subsystem error taxonomy.
///
/// Fatal initialization errors (key generation, share storage) abort
/// startup. Cryptographic-service errors on on-demand calls propagate to
/// the caller and are never conflated with a `false` verification result.
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Distributed key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Key share storage failed: {0}")]
    KeyShareStorageFailed(String),

    #[error("Cryptographic service error: {0}")]
    CryptoService(String),

    #[error("Key rotation failed during {stage}: {reason}")]
    RotationFailed {
        stage: RotationStage,
        reason: String,
    },

    #[error("No active key epoch")]
    NoActiveKey,

    #[error("Security orchestrator not initialized")]
    NotInitialized,

    #[error("Security orchestrator already initialized")]
    AlreadyInitialized,

    #[error("Security orchestrator is shutting down")]
    ShuttingDown,

    #[error("Notification bus error: {0}")]
    Notifier(String),
}

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;
