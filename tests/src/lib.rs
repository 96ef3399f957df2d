//! # Sentinel-Chain Test Suite
//!
//! Unified test crate containing cross-crate security scenarios:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── security_pipeline.rs   # snapshot → detectors → mitigation → bus
//!     ├── key_lifecycle.rs       # rotation atomicity, concurrent signing
//!     └── reputation_flow.rs     # membership + trust accounting over the API
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sc-tests
//! cargo test -p sc-tests integration::key_lifecycle::
//! ```

#![allow(dead_code)]

pub mod integration;

use std::sync::Arc;

use sc_security::adapters::{
    BusNotifier, EquivocationMonitor, InMemoryKeyVault, MemoryAuditSink, SoftwareCryptoService,
    ThrottlingTransportControl,
};
use sc_security::{SecurityConfig, SecurityDependencies, SecurityOrchestrator};
use shared_bus::InMemoryEventBus;
use shared_types::{NetworkFingerprint, NodeId, Participant, Timestamp};

/// Orchestrator wired with the production-shaped adapter set: software
/// crypto, equivocation oracle, throttling transport, broadcast bus.
pub type PipelineOrchestrator = SecurityOrchestrator<
    SoftwareCryptoService,
    EquivocationMonitor,
    ThrottlingTransportControl,
    MemoryAuditSink,
    InMemoryKeyVault,
    BusNotifier,
>;

/// Install a subscriber once so failing scenarios come with readable logs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A deterministic participant; `region_split` spreads fingerprints so the
/// default scenarios do not trip the Sybil detector by accident.
pub fn test_participant(index: u8) -> Participant {
    Participant {
        node_id: NodeId::new([index; 32]),
        public_key: vec![index; 32],
        fingerprint: NetworkFingerprint::new(
            format!("10.{index}.0.0/24"),
            64_000 + index as u32,
            format!("region-{index}"),
        ),
        joined_at: Timestamp::new(1_700_000_000),
    }
}

/// Build a pipeline orchestrator plus the bus it publishes to.
pub fn pipeline_orchestrator(
    config: SecurityConfig,
    participants: Vec<Participant>,
) -> (PipelineOrchestrator, Arc<InMemoryEventBus>) {
    let bus = Arc::new(InMemoryEventBus::new());
    let orchestrator = SecurityOrchestrator::new(SecurityDependencies {
        crypto: Arc::new(SoftwareCryptoService::with_seed(0xD1CE)),
        monitor: Arc::new(EquivocationMonitor::new()),
        transport: Arc::new(ThrottlingTransportControl::default()),
        audit: Arc::new(MemoryAuditSink::new()),
        vault: Arc::new(InMemoryKeyVault::new()),
        notifier: Arc::new(BusNotifier::new(Arc::clone(&bus))),
        config,
    })
    .with_participants(participants);
    (orchestrator, bus)
}
