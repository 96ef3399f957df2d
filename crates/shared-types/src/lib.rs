//! # Shared Types Crate
//!
//! This crate contains the domain entities shared across Sentinel-Chain
//! subsystems: participant identity, attack reports, security events,
//! metrics snapshots, and the token-bucket rate limiter.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a subsystem
//!   boundary (events on the shared bus, port signatures) is defined here.
//! - **Closed event taxonomy**: attack and event kinds are tagged unions,
//!   never free-form strings, so consumers are exhaustively checked at
//!   compile time.

pub mod entities;
pub mod events;
pub mod metrics;
pub mod rate_limiter;

pub use entities::*;
pub use events::*;
pub use metrics::SecurityMetrics;
pub use rate_limiter::RateLimiter;
