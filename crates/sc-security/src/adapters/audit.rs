//! # Audit Sink Adapters
//!
//! `TracingAuditSink` forwards structured records into the `tracing`
//! fabric; `MemoryAuditSink` captures them for test assertions.

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::ports::{AuditContext, AuditSink};

/// Audit record level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
}

/// Production sink writing to the `tracing` subscriber under the
/// `security_audit` target.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn info(&self, message: &str, context: &AuditContext) {
        info!(target: "security_audit", context = %context, "{message}");
    }

    fn warn(&self, message: &str, context: &AuditContext) {
        warn!(target: "security_audit", context = %context, "{message}");
    }

    fn error(&self, message: &str, context: &AuditContext) {
        error!(target: "security_audit", context = %context, "{message}");
    }

    fn flush(&self) {
        // The tracing subscriber owns buffering; nothing held here.
    }
}

/// One captured audit record.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub level: AuditLevel,
    pub message: String,
    pub context: String,
}

/// Test sink capturing records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Count of records at `level`.
    pub fn count_at(&self, level: AuditLevel) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .count()
    }

    fn push(&self, level: AuditLevel, message: &str, context: &AuditContext) {
        self.records.lock().push(AuditRecord {
            level,
            message: message.to_string(),
            context: context.to_string(),
        });
    }
}

impl AuditSink for MemoryAuditSink {
    fn info(&self, message: &str, context: &AuditContext) {
        self.push(AuditLevel::Info, message, context);
    }

    fn warn(&self, message: &str, context: &AuditContext) {
        self.push(AuditLevel::Warn, message, context);
    }

    fn error(&self, message: &str, context: &AuditContext) {
        self.push(AuditLevel::Error, message, context);
    }

    fn flush(&self) {}
}
