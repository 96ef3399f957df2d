//! # Reputation Registry
//!
//! The only writer of trust scores. Scores live in `[0.0, 1.0]`, start at
//! neutral `0.5` on admission, and are clamped after every adjustment. A
//! single adjustment never moves a score by more than the configured cap,
//! which bounds the blast radius of one false-positive detection.
//!
//! Unknown node ids are a no-op on adjustment: a tick racing a concurrent
//! `remove_participant` must degrade to nothing, not panic.

use std::collections::HashMap;

use shared_types::NodeId;

/// Score assigned on admission.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Default cap on the magnitude of a single adjustment.
pub const MAX_SINGLE_ADJUSTMENT: f64 = 0.3;

/// Per-participant trust scores.
#[derive(Debug)]
pub struct ReputationRegistry {
    scores: HashMap<NodeId, f64>,
    max_single_adjustment: f64,
}

impl Default for ReputationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReputationRegistry {
    pub fn new() -> Self {
        Self::with_adjustment_cap(MAX_SINGLE_ADJUSTMENT)
    }

    /// Registry with a custom single-adjustment cap (policy table value).
    pub fn with_adjustment_cap(max_single_adjustment: f64) -> Self {
        Self {
            scores: HashMap::new(),
            max_single_adjustment,
        }
    }

    /// Set every listed node to neutral.
    pub fn initialize(&mut self, node_ids: &[NodeId]) {
        for id in node_ids {
            self.scores.insert(*id, NEUTRAL_SCORE);
        }
    }

    /// Admit one node at neutral, unless already tracked.
    pub fn admit(&mut self, node_id: NodeId) {
        self.scores.entry(node_id).or_insert(NEUTRAL_SCORE);
    }

    /// Drop a node's score entirely.
    pub fn forget(&mut self, node_id: &NodeId) {
        self.scores.remove(node_id);
    }

    /// Apply a bounded, clamped adjustment.
    ///
    /// The delta magnitude is capped first, then the result is clamped to
    /// `[0, 1]`. Unknown ids are a no-op.
    pub fn adjust(&mut self, node_id: &NodeId, delta: f64) {
        let Some(score) = self.scores.get_mut(node_id) else {
            return;
        };
        let capped = delta.clamp(-self.max_single_adjustment, self.max_single_adjustment);
        *score = (*score + capped).clamp(0.0, 1.0);
    }

    /// Current score, or neutral for untracked ids.
    pub fn get(&self, node_id: &NodeId) -> f64 {
        self.scores.get(node_id).copied().unwrap_or(NEUTRAL_SCORE)
    }

    /// Count of participants scoring strictly above `threshold`.
    pub fn count_above(&self, threshold: f64) -> usize {
        self.scores.values().filter(|s| **s > threshold).count()
    }

    /// Regress every score towards neutral by `factor` (0..=1).
    ///
    /// `factor = 1.0` leaves scores untouched; `0.0` resets to neutral.
    pub fn decay_towards_neutral(&mut self, factor: f64) {
        let factor = factor.clamp(0.0, 1.0);
        for score in self.scores.values_mut() {
            *score = NEUTRAL_SCORE + (*score - NEUTRAL_SCORE) * factor;
        }
    }

    /// Frozen copy of every tracked score.
    pub fn snapshot(&self) -> HashMap<NodeId, f64> {
        self.scores.clone()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
