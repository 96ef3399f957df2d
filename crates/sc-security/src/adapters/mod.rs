//! Adapters implementing the outbound ports.

pub mod audit;
pub mod crypto;
pub mod event_bus;
pub mod monitor;
pub mod transport;
pub mod vault;

pub use audit::{AuditLevel, AuditRecord, MemoryAuditSink, TracingAuditSink};
pub use crypto::{derive_dlog_public_key, SoftwareCryptoService};
pub use event_bus::{BusNotifier, MemoryNotifier};
pub use monitor::{EquivocationMonitor, NullConsensusMonitor};
pub use transport::{
    NoOpTransportControl, RecordingTransportControl, ThrottlingTransportControl, TransportCommand,
};
pub use vault::InMemoryKeyVault;
