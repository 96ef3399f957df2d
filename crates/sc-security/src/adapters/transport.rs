//! # Transport Control Adapters
//!
//! Implementations of the fire-and-forget transport port.
//!
//! ## Mock vs Production
//!
//! | Adapter | Role |
//! |---------|------|
//! | `NoOpTransportControl` | Testing: accepts everything |
//! | `RecordingTransportControl` | Testing: captures commands for assertions |
//! | `ThrottlingTransportControl` | Production: token-bucket throttles and filters |

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{NodeId, RateLimiter};
use tracing::info;

use crate::ports::TransportControl;

// =============================================================================
// NO-OP (TESTING)
// =============================================================================

/// Accepts every command and does nothing.
#[derive(Debug, Default)]
pub struct NoOpTransportControl;

impl NoOpTransportControl {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportControl for NoOpTransportControl {
    async fn request_identity_verification(&self, _nodes: &[NodeId]) -> Result<(), String> {
        Ok(())
    }

    async fn establish_honest_connections(&self, _peers: &[NodeId]) -> Result<(), String> {
        Ok(())
    }

    async fn broadcast_node_status(&self, _node_id: NodeId) -> Result<(), String> {
        Ok(())
    }

    async fn apply_rate_limit(&self, _node: NodeId) -> Result<(), String> {
        Ok(())
    }

    async fn filter_node_messages(&self, _node: NodeId) -> Result<(), String> {
        Ok(())
    }

    async fn restart_consensus_round(&self, _remaining: &[NodeId]) -> Result<(), String> {
        Ok(())
    }
}

// =============================================================================
// RECORDING (TESTING)
// =============================================================================

/// One issued transport command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    IdentityVerification(Vec<NodeId>),
    EstablishConnections(Vec<NodeId>),
    BroadcastStatus(NodeId),
    RateLimit(NodeId),
    FilterMessages(NodeId),
    RestartRound(Vec<NodeId>),
}

/// Captures every command for test assertions.
#[derive(Debug, Default)]
pub struct RecordingTransportControl {
    log: Mutex<Vec<TransportCommand>>,
}

impl RecordingTransportControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything issued so far, in order.
    pub fn commands(&self) -> Vec<TransportCommand> {
        self.log.lock().clone()
    }

    fn record(&self, command: TransportCommand) {
        self.log.lock().push(command);
    }
}

#[async_trait]
impl TransportControl for RecordingTransportControl {
    async fn request_identity_verification(&self, nodes: &[NodeId]) -> Result<(), String> {
        self.record(TransportCommand::IdentityVerification(nodes.to_vec()));
        Ok(())
    }

    async fn establish_honest_connections(&self, peers: &[NodeId]) -> Result<(), String> {
        self.record(TransportCommand::EstablishConnections(peers.to_vec()));
        Ok(())
    }

    async fn broadcast_node_status(&self, node_id: NodeId) -> Result<(), String> {
        self.record(TransportCommand::BroadcastStatus(node_id));
        Ok(())
    }

    async fn apply_rate_limit(&self, node: NodeId) -> Result<(), String> {
        self.record(TransportCommand::RateLimit(node));
        Ok(())
    }

    async fn filter_node_messages(&self, node: NodeId) -> Result<(), String> {
        self.record(TransportCommand::FilterMessages(node));
        Ok(())
    }

    async fn restart_consensus_round(&self, remaining: &[NodeId]) -> Result<(), String> {
        self.record(TransportCommand::RestartRound(remaining.to_vec()));
        Ok(())
    }
}

// =============================================================================
// THROTTLING (PRODUCTION)
// =============================================================================

/// Production adapter backed by per-node token buckets.
///
/// Mitigation installs a bucket or a filter here; the transport layer
/// consults `admit_message` on every inbound message. Commands aimed at
/// the wider network (identity verification, reconnects, round restarts)
/// are emitted as structured log notifications for the gossip layer to
/// pick up.
pub struct ThrottlingTransportControl {
    /// Burst capacity for newly throttled nodes.
    limit_capacity: u64,
    /// Refill rate (tokens per second) for newly throttled nodes.
    limit_refill: u64,
    limiters: RwLock<HashMap<NodeId, Arc<RateLimiter>>>,
    filtered: RwLock<HashSet<NodeId>>,
}

impl ThrottlingTransportControl {
    pub fn new(limit_capacity: u64, limit_refill: u64) -> Self {
        Self {
            limit_capacity,
            limit_refill,
            limiters: RwLock::new(HashMap::new()),
            filtered: RwLock::new(HashSet::new()),
        }
    }

    /// Whether a message from `node` should be admitted.
    ///
    /// Filtered nodes are refused outright; throttled nodes consume a
    /// token; everyone else passes.
    pub fn admit_message(&self, node: &NodeId) -> bool {
        if self.filtered.read().contains(node) {
            return false;
        }
        match self.limiters.read().get(node) {
            Some(limiter) => limiter.try_acquire(),
            None => true,
        }
    }

    /// Whether `node` is currently filtered.
    pub fn is_filtered(&self, node: &NodeId) -> bool {
        self.filtered.read().contains(node)
    }
}

impl Default for ThrottlingTransportControl {
    fn default() -> Self {
        Self::new(100, 10)
    }
}

#[async_trait]
impl TransportControl for ThrottlingTransportControl {
    async fn request_identity_verification(&self, nodes: &[NodeId]) -> Result<(), String> {
        info!(count = nodes.len(), "Requesting identity verification");
        Ok(())
    }

    async fn establish_honest_connections(&self, peers: &[NodeId]) -> Result<(), String> {
        info!(count = peers.len(), "Re-establishing honest connections");
        Ok(())
    }

    async fn broadcast_node_status(&self, node_id: NodeId) -> Result<(), String> {
        info!(node = ?node_id, "Broadcasting node status");
        Ok(())
    }

    async fn apply_rate_limit(&self, node: NodeId) -> Result<(), String> {
        self.limiters
            .write()
            .entry(node)
            .or_insert_with(|| Arc::new(RateLimiter::new(self.limit_capacity, self.limit_refill)));
        info!(node = ?node, "Rate limit installed");
        Ok(())
    }

    async fn filter_node_messages(&self, node: NodeId) -> Result<(), String> {
        self.filtered.write().insert(node);
        info!(node = ?node, "Message filter installed");
        Ok(())
    }

    async fn restart_consensus_round(&self, remaining: &[NodeId]) -> Result<(), String> {
        info!(
            participants = remaining.len(),
            "Requesting consensus round restart"
        );
        Ok(())
    }
}
