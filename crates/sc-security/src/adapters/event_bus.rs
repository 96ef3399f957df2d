//! Notifier adapters
//!
//! `BusNotifier` publishes into the shared broadcast bus for external
//! consumers; `MemoryNotifier` captures notifications for tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, InMemoryEventBus, SecurityBusEvent};

use crate::ports::SecurityNotifier;

/// Production notifier backed by the shared broadcast bus.
pub struct BusNotifier {
    bus: Arc<InMemoryEventBus>,
}

impl BusNotifier {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl SecurityNotifier for BusNotifier {
    async fn notify(&self, event: SecurityBusEvent) -> Result<(), String> {
        // Zero subscribers is fine; notifications are fire-and-forget
        self.bus.publish(event).await;
        Ok(())
    }
}

/// Test notifier capturing every event.
#[derive(Default)]
pub struct MemoryNotifier {
    events: RwLock<Vec<SecurityBusEvent>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, in order.
    pub fn events(&self) -> Vec<SecurityBusEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

#[async_trait]
impl SecurityNotifier for MemoryNotifier {
    async fn notify(&self, event: SecurityBusEvent) -> Result<(), String> {
        self.events.write().push(event);
        Ok(())
    }
}
