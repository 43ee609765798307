//! Fclean - a safe file cleanup library
//!
//! This crate provides the scanning, whitelist-protection and deletion
//! engine behind the fclean tool: classify files by extension or by the
//! absence of one, keep critical directories off limits, and remove
//! candidates either reversibly (system trash) or permanently.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod executor;
pub mod scanner;
pub mod session;
pub mod whitelist;

// Re-export primary types for convenience
pub use config::UserConfig;
pub use domain::{
    DeleteMode, DeletionErrorKind, DeletionOutcome, DeletionSummary, FileRecord, ScanMode,
    ScanRequest, SYSTEM_ARTIFACTS,
};
pub use error::{FcleanError, Result};
pub use events::{AuditEvent, EventLevel, EventSink, MemorySink, NullSink};
pub use executor::{DeletionExecutor, SystemTrash, TrashProvider};
pub use scanner::{scan, scan_with_cancel};
pub use session::{BackgroundRunner, CancelFlag, CleanSession, SessionState};
pub use whitelist::{AddEntry, WhitelistSet, DEFAULT_WHITELIST};
