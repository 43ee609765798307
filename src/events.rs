//! Audit events emitted by the scan and deletion engine
//!
//! The core reports progress as a stream of leveled, timestamped events
//! handed to an [`EventSink`]. What happens to them (console, log pane,
//! file) is the consumer's business.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventLevel::Info => write!(f, "INFO"),
            EventLevel::Warning => write!(f, "WARN"),
            EventLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A single audit entry: level, human-readable message, emission time.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub level: EventLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, message)
    }
}

/// Consumer of audit events.
///
/// Implementations must be callable from worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: AuditEvent) {}
}

/// Buffers events in memory; used by tests and by callers that want to
/// render the stream after the fact.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("event buffer poisoned").clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|e| e.message).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: AuditEvent) {
        self.events.lock().expect("event buffer poisoned").push(event);
    }
}

/// Forwards events over an unbounded channel; lets a background worker
/// stream progress to the thread that spawned it.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<AuditEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: AuditEvent) {
        // Receiver gone means nobody is listening anymore; drop the event.
        let _ = self.tx.send(event);
    }
}
