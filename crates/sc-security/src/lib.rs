//! # sc-security
//!
//! Consensus security subsystem for Sentinel-Chain.
//!
//! ## Architecture
//!
//! The security envelope around the consensus protocol: attack
//! surveillance, trust accounting, mitigation policy, and key lifecycle
//! coordination. The consensus algorithm itself, transport, and the
//! cryptographic mathematics are external collaborators behind ports.
//!
//! ```text
//!                    ┌────────────────────────────┐
//!    tick ──────────▶│  snapshot ─▶ detectors     │
//!                    │  (Byzantine, Sybil,        │
//!                    │   Eclipse, DoS)            │
//!                    └──────────────┬─────────────┘
//!                                   │ AttackReport
//!                                   ▼
//!                    ┌────────────────────────────┐
//!                    │  mitigation engine         │──▶ reputation registry
//!                    │  (append event, then act)  │──▶ transport control
//!                    └──────────────┬─────────────┘──▶ crypto service
//!                                   │
//!                                   ▼
//!                         event log + shared bus
//! ```
//!
//! ## Trust accounting
//!
//! Reputation scores live in `[0, 1]`, start neutral at `0.5`, and are
//! written only by the mitigation engine. A single adjustment is capped so
//! one false positive cannot destroy a participant's standing.
//!
//! ## Key lifecycle
//!
//! `rotate_keys` holds the key-state lock across a full re-encryption
//! sweep: at every observable instant exactly one key epoch is active,
//! and a failed sweep leaves the old epoch in place.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sc_security::{SecurityOrchestrator, SecurityDependencies, SecurityConfig};
//! use sc_security::ports::SecurityApi;
//!
//! let orchestrator = SecurityOrchestrator::new(SecurityDependencies {
//!     crypto, monitor, transport, audit, vault, notifier,
//!     config: SecurityConfig::default(),
//! });
//! orchestrator.initialize().await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;

// Re-export main types
pub use domain::{
    CurveKind, DetectorThresholds, MitigationPolicy, ObservedMessage, RotationStage,
    SecurityConfig, SecurityError, SecurityResult, SecuritySnapshot,
};
pub use ports::{SecurityApi, SystemTimeSource, TimeSource};
pub use service::{SecurityDependencies, SecurityOrchestrator};
pub use state::SecurityState;
