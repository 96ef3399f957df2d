//! Ports: the driving API and the driven external contracts.

pub mod inbound;
pub mod outbound;

pub use inbound::SecurityApi;
pub use outbound::{
    AuditContext, AuditSink, ConsensusMonitor, KeyVault, SecurityNotifier, SystemTimeSource,
    ThresholdCryptoService, TimeSource, TransportControl,
};
