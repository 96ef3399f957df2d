//! # Shared Bus - Typed Notification Bus for Security Events
//!
//! The process-wide observer mechanism consumers use to follow what the
//! security subsystem detects and does.
//!
//! ## Design
//!
//! - The event set is a **closed tagged union** (`SecurityBusEvent`), so
//!   every consumer match is exhaustively checked at compile time; there is
//!   no "emit by string name" escape hatch.
//! - Delivery is `tokio::sync::broadcast`: multi-producer, multi-consumer,
//!   slow subscribers lag rather than block the publisher.
//!
//! ```text
//! ┌───────────────┐                    ┌───────────────┐
//! │ sc-security   │                    │ API layer /   │
//! │ orchestrator  │    publish()       │ operators     │
//! │               │ ──────┐            │               │
//! └───────────────┘       │            └───────────────┘
//!                         ▼                    ↑
//!                   ┌───────────┐             │
//!                   │ Event Bus │ ────────────┘
//!                   └───────────┘   subscribe()
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, SecurityBusEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
