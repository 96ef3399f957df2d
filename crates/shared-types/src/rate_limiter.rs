//! # Rate Limiter
//!
//! Token bucket used by the transport-control adapter to throttle nodes
//! flagged by the DoS detector.
//!
//! ## Algorithm
//!
//! - Tokens refill at a fixed per-second rate, capped at the bucket size
//! - Each message admission consumes one token
//! - Admission is refused when the bucket is empty

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Token bucket rate limiter.
pub struct RateLimiter {
    /// Maximum burst size.
    capacity: u64,
    /// Tokens added per second.
    refill_rate: u64,
    /// Currently available tokens.
    tokens: AtomicU64,
    /// Last refill instant.
    last_refill: Mutex<Instant>,
}

impl RateLimiter {
    /// Create a bucket that admits bursts of `capacity` and refills at
    /// `refill_rate` tokens per second.
    pub fn new(capacity: u64, refill_rate: u64) -> Self {
        Self {
            capacity,
            refill_rate,
            tokens: AtomicU64::new(capacity),
            last_refill: Mutex::new(Instant::now()),
        }
    }

    /// Try to admit one message.
    ///
    /// Returns `false` when the bucket is empty (the caller is throttled).
    pub fn try_acquire(&self) -> bool {
        self.refill();

        loop {
            let current = self.tokens.load(Ordering::Relaxed);
            if current == 0 {
                return false;
            }
            if self
                .tokens
                .compare_exchange(current, current - 1, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }

    /// Currently available tokens.
    pub fn available(&self) -> u64 {
        self.tokens.load(Ordering::Relaxed)
    }

    fn refill(&self) {
        let mut last = match self.last_refill.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        let elapsed = now.duration_since(*last);

        let tokens_to_add = (elapsed.as_secs_f64() * self.refill_rate as f64) as u64;
        if tokens_to_add == 0 {
            return;
        }
        *last = now;

        loop {
            let current = self.tokens.load(Ordering::Relaxed);
            let refilled = (current + tokens_to_add).min(self.capacity);
            if self
                .tokens
                .compare_exchange(current, refilled, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }
    }
}
