//! Security Orchestrator - Core service
//!
//! Owns the monitoring loop, the participant set, the audit event stream,
//! and the public API the consensus layer and operators call into.
//!
//! # Architecture
//! - One periodic tick drives all detectors against an immutable snapshot
//! - Detector reports are mitigated in detector order within the tick
//! - On-demand operations (signatures, proofs, rotation, membership) run
//!   re-entrantly alongside the tick; shared state sits behind locks
//! - Constructed once at the composition root and passed by handle; there
//!   is no global instance

mod api;
mod mitigation;
mod rotation;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use shared_types::{AttackReport, NodeId};
use tokio::time::MissedTickBehavior;

use crate::domain::{detectors, SecurityConfig, SecuritySnapshot};
use crate::ports::{
    AuditContext, AuditSink, ConsensusMonitor, SecurityNotifier, SystemTimeSource,
    ThresholdCryptoService, TimeSource, TransportControl,
};
use crate::ports::outbound::KeyVault;
use crate::state::SecurityState;

/// The security orchestrator service.
pub struct SecurityOrchestrator<C, M, T, A, V, N>
where
    C: ThresholdCryptoService,
    M: ConsensusMonitor,
    T: TransportControl,
    A: AuditSink,
    V: KeyVault,
    N: SecurityNotifier,
{
    pub(crate) crypto: Arc<C>,
    pub(crate) monitor: Arc<M>,
    pub(crate) transport: Arc<T>,
    pub(crate) audit: Arc<A>,
    pub(crate) vault: Arc<V>,
    pub(crate) notifier: Arc<N>,
    pub(crate) state: Arc<SecurityState>,
    pub(crate) config: Arc<SecurityConfig>,
    pub(crate) time_source: Arc<dyn TimeSource>,
}

/// Dependencies for `SecurityOrchestrator`.
pub struct SecurityDependencies<C, M, T, A, V, N> {
    pub crypto: Arc<C>,
    pub monitor: Arc<M>,
    pub transport: Arc<T>,
    pub audit: Arc<A>,
    pub vault: Arc<V>,
    pub notifier: Arc<N>,
    pub config: SecurityConfig,
}

impl<C, M, T, A, V, N> Clone for SecurityOrchestrator<C, M, T, A, V, N>
where
    C: ThresholdCryptoService,
    M: ConsensusMonitor,
    T: TransportControl,
    A: AuditSink,
    V: KeyVault,
    N: SecurityNotifier,
{
    fn clone(&self) -> Self {
        Self {
            crypto: Arc::clone(&self.crypto),
            monitor: Arc::clone(&self.monitor),
            transport: Arc::clone(&self.transport),
            audit: Arc::clone(&self.audit),
            vault: Arc::clone(&self.vault),
            notifier: Arc::clone(&self.notifier),
            state: Arc::clone(&self.state),
            config: Arc::clone(&self.config),
            time_source: Arc::clone(&self.time_source),
        }
    }
}

impl<C, M, T, A, V, N> SecurityOrchestrator<C, M, T, A, V, N>
where
    C: ThresholdCryptoService,
    M: ConsensusMonitor,
    T: TransportControl,
    A: AuditSink,
    V: KeyVault,
    N: SecurityNotifier,
{
    /// Create a new orchestrator.
    pub fn new(deps: SecurityDependencies<C, M, T, A, V, N>) -> Self {
        let state = SecurityState::with_adjustment_cap(deps.config.policy.max_single_adjustment);
        Self {
            crypto: deps.crypto,
            monitor: deps.monitor,
            transport: deps.transport,
            audit: deps.audit,
            vault: deps.vault,
            notifier: deps.notifier,
            state: Arc::new(state),
            config: Arc::new(deps.config),
            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Seed the participant set before initialization.
    pub fn with_participants(self, participants: Vec<shared_types::Participant>) -> Self {
        {
            let mut set = self.state.participants.write();
            let mut reputation = self.state.reputation.write();
            for participant in participants {
                reputation.admit(participant.node_id);
                set.insert(participant);
            }
        }
        self
    }

    /// Set custom time source (for testing).
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// This node's identity, once initialized.
    pub fn local_node_id(&self) -> Option<NodeId> {
        *self.state.local_node_id.read()
    }

    // === MONITORING ===

    /// Take the immutable view this tick will run against.
    ///
    /// Buffered consensus messages are drained: each batch is analyzed by
    /// exactly one tick.
    pub(crate) fn take_snapshot(&self) -> SecuritySnapshot {
        let participants = {
            let set = self.state.participants.read();
            set.iter().cloned().collect::<Vec<_>>()
        };
        let (reputation, honest_peer_count) = {
            let registry = self.state.reputation.read();
            (
                registry.snapshot(),
                registry.count_above(self.config.thresholds.honesty_threshold),
            )
        };
        let message_rates = self.state.traffic.read().clone();
        let recent_messages = std::mem::take(&mut *self.state.message_buffer.write());

        SecuritySnapshot {
            taken_at: self.time_source.now(),
            participants,
            message_rates,
            recent_messages,
            reputation,
            honest_peer_count,
        }
    }

    /// Run every detector against a fresh snapshot and mitigate whatever
    /// they report.
    ///
    /// Detector order is fixed: Byzantine, Sybil, Eclipse, DoS. A failing
    /// oracle is logged and skipped; it never cancels the tick.
    pub async fn perform_security_check(&self) {
        let snapshot = self.take_snapshot();

        let mut reports: Vec<AttackReport> = Vec::new();
        match self.monitor.detect_byzantine_attacks(&snapshot).await {
            Ok(byzantine) => reports.extend(byzantine),
            Err(reason) => self.audit.warn(
                "Byzantine detector failed; continuing tick",
                &AuditContext::new().field("reason", reason),
            ),
        }
        reports.extend(detectors::run_local_detectors(
            &snapshot,
            &self.config.thresholds,
        ));

        if reports.is_empty() {
            return;
        }
        self.handle_detected_attacks(reports).await;
    }

    // === MAINTENANCE ===

    /// Regress all trust scores towards neutral by the policy decay
    /// factor.
    ///
    /// Scheduled by the host on a slower cadence than the monitoring tick,
    /// so stale good (or bad) standing fades unless behavior keeps earning
    /// it.
    pub fn run_reputation_decay(&self) {
        self.state
            .reputation
            .write()
            .decay_towards_neutral(self.config.policy.decay_factor);
    }

    /// The periodic monitoring loop body; exits when `running` clears.
    pub(crate) async fn monitor_loop(self) {
        let mut interval = tokio::time::interval(self.config.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of tokio's interval fires immediately; skip it so
        // ticks start one full period after initialization
        interval.tick().await;

        loop {
            interval.tick().await;
            if !self.state.running.load(Ordering::SeqCst) {
                break;
            }
            self.perform_security_check().await;
        }
    }
}
