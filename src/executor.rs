//! Deletion execution
//!
//! Takes the candidate list a scan produced and attempts each removal
//! independently. The batch never stops on a failure and nothing is rolled
//! back; partial completion is a valid terminal state and the summary
//! reports it faithfully.

use crate::domain::{
    DeleteMode, DeletionErrorKind, DeletionOutcome, DeletionSummary, FileRecord,
};
use crate::error::{FcleanError, Result};
use crate::events::{AuditEvent, EventSink};
use crate::session::CancelFlag;
use std::fs;
use std::io;
use std::path::Path;

/// Reversible-delete capability. The production implementation hands files
/// to the OS recycle bin; tests substitute their own.
pub trait TrashProvider: Send + Sync {
    fn send_to_trash(&self, path: &Path) -> io::Result<()>;
}

/// [`TrashProvider`] backed by the platform trash via the `trash` crate.
pub struct SystemTrash;

impl TrashProvider for SystemTrash {
    fn send_to_trash(&self, path: &Path) -> io::Result<()> {
        trash::delete(path).map_err(trash_error_to_io)
    }
}

fn trash_error_to_io(err: trash::Error) -> io::Error {
    match err {
        trash::Error::CouldNotAccess { .. } => {
            io::Error::new(io::ErrorKind::PermissionDenied, err.to_string())
        }
        // Canonicalization fails when the target no longer exists
        trash::Error::CanonicalizePath { .. } => {
            io::Error::new(io::ErrorKind::NotFound, err.to_string())
        }
        trash::Error::Os { code, .. } => io::Error::from_raw_os_error(code),
        other => io::Error::other(other.to_string()),
    }
}

/// Runs deletion batches, emitting one event per attempted file.
pub struct DeletionExecutor<'a> {
    trash: &'a dyn TrashProvider,
    events: &'a dyn EventSink,
    dry_run: bool,
}

impl<'a> DeletionExecutor<'a> {
    pub fn new(trash: &'a dyn TrashProvider, events: &'a dyn EventSink) -> Self {
        Self {
            trash,
            events,
            dry_run: false,
        }
    }

    /// In dry-run mode every candidate is reported as a success and the
    /// filesystem is left untouched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Attempts every candidate exactly once, in the order supplied.
    ///
    /// An empty candidate list is a usage error, reported before any
    /// attempt. Everything else is recorded per item in the summary.
    pub fn execute(&self, candidates: &[FileRecord], mode: DeleteMode) -> Result<DeletionSummary> {
        self.execute_with_cancel(candidates, mode, &CancelFlag::new())
    }

    /// Like [`DeletionExecutor::execute`], stopping between files once
    /// `cancel` is set. A cancelled batch's summary covers only the items
    /// actually attempted.
    pub fn execute_with_cancel(
        &self,
        candidates: &[FileRecord],
        mode: DeleteMode,
        cancel: &CancelFlag,
    ) -> Result<DeletionSummary> {
        if candidates.is_empty() {
            return Err(FcleanError::EmptyBatch);
        }

        self.events.emit(AuditEvent::info(format!(
            "deletion started: {} files, mode {}{}",
            candidates.len(),
            mode,
            if self.dry_run { " (dry run)" } else { "" }
        )));

        let mut outcomes = Vec::with_capacity(candidates.len());
        for record in candidates {
            if cancel.is_cancelled() {
                self.events.emit(AuditEvent::warning(format!(
                    "deletion cancelled after {} of {} files",
                    outcomes.len(),
                    candidates.len()
                )));
                break;
            }

            let outcome = self.delete_one(record, mode);
            if outcome.succeeded {
                self.events
                    .emit(AuditEvent::info(format!("deleted: {}", record.name)));
            } else {
                let message = format!("failed to delete {}: {}", record.name, outcome.detail);
                self.events.emit(match outcome.error_kind {
                    DeletionErrorKind::NotFound => AuditEvent::warning(message),
                    _ => AuditEvent::error(message),
                });
            }
            outcomes.push(outcome);
        }

        let summary = DeletionSummary::from_outcomes(outcomes);
        self.events.emit(AuditEvent::info(format!(
            "deletion complete: {} succeeded, {} failed",
            summary.success_count, summary.error_count
        )));

        Ok(summary)
    }

    fn delete_one(&self, record: &FileRecord, mode: DeleteMode) -> DeletionOutcome {
        if self.dry_run {
            return DeletionOutcome::success(record.path.clone());
        }

        let result = match mode {
            DeleteMode::Trash => self.trash.send_to_trash(&record.path),
            DeleteMode::Permanent => fs::remove_file(&record.path),
        };

        match result {
            Ok(()) => DeletionOutcome::success(record.path.clone()),
            Err(err) => {
                DeletionOutcome::failure(record.path.clone(), classify(&err), err.to_string())
            }
        }
    }
}

fn classify(err: &io::Error) -> DeletionErrorKind {
    match err.kind() {
        io::ErrorKind::PermissionDenied => DeletionErrorKind::PermissionDenied,
        io::ErrorKind::NotFound => DeletionErrorKind::NotFound,
        _ => DeletionErrorKind::Other,
    }
}
