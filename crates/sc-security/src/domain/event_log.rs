//! Append-only store for security events.
//!
//! Events are retained for the lifetime of the process; durable persistence
//! belongs to the audit sink.

use shared_types::SecurityEvent;

/// Append-only event history.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SecurityEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event. Events are never mutated or removed afterwards.
    pub fn append(&mut self, event: SecurityEvent) {
        self.events.push(event);
    }

    /// The most recent `limit` events in chronological order, or the full
    /// history when no limit is given.
    pub fn recent(&self, limit: Option<usize>) -> Vec<SecurityEvent> {
        match limit {
            Some(n) => {
                let start = self.events.len().saturating_sub(n);
                self.events[start..].to_vec()
            }
            None => self.events.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate in append order.
    pub fn iter(&self) -> impl Iterator<Item = &SecurityEvent> {
        self.events.iter()
    }
}
