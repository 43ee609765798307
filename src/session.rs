//! Cleanup session state and background execution
//!
//! A [`CleanSession`] owns the whitelist and the candidate list for one
//! scan-confirm-delete cycle and enforces the state machine
//! `Idle -> Confirming -> Executing -> Completed`. Scanning and deletion
//! can run on the calling thread or be handed to a [`BackgroundRunner`]
//! so an interactive frontend stays responsive.

use crate::domain::{DeleteMode, DeletionSummary, FileRecord, ScanRequest};
use crate::error::{FcleanError, Result};
use crate::events::{AuditEvent, ChannelSink, EventSink};
use crate::executor::{DeletionExecutor, SystemTrash, TrashProvider};
use crate::scanner;
use crate::whitelist::{AddEntry, WhitelistSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Cooperative cancellation flag, checked between files by the scanner and
/// the executor. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Confirming,
    Executing,
    Completed,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Confirming => "Confirming",
            SessionState::Executing => "Executing",
            SessionState::Completed => "Completed",
        }
    }
}

/// One scan-and-delete cycle. Owns the whitelist; there is no ambient
/// global state.
#[derive(Debug)]
pub struct CleanSession {
    whitelist: WhitelistSet,
    candidates: Vec<FileRecord>,
    state: SessionState,
    cancel: CancelFlag,
}

impl CleanSession {
    pub fn new() -> Self {
        Self::with_whitelist(WhitelistSet::with_defaults())
    }

    pub fn with_whitelist(whitelist: WhitelistSet) -> Self {
        Self {
            whitelist,
            candidates: Vec::new(),
            state: SessionState::Idle,
            cancel: CancelFlag::new(),
        }
    }

    pub fn whitelist(&self) -> &WhitelistSet {
        &self.whitelist
    }

    pub fn add_whitelist_entry(&mut self, name: &str) -> AddEntry {
        self.whitelist.add_entry(name)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn candidates(&self) -> &[FileRecord] {
        &self.candidates
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.candidates.iter().map(|r| r.size_bytes).sum()
    }

    /// Shared handle for cancelling whatever the session is doing.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Scans on the calling thread and stages the results.
    pub fn scan(&mut self, request: &ScanRequest, events: &dyn EventSink) -> Result<usize> {
        self.require(SessionState::Idle)?;
        let records = scanner::scan_with_cancel(request, &self.whitelist, events, &self.cancel)?;
        self.stage_candidates(records)
    }

    /// Stages records produced elsewhere (e.g. by a background scan).
    /// With at least one candidate the session moves to `Confirming`;
    /// an empty result keeps it in `Idle`.
    pub fn stage_candidates(&mut self, records: Vec<FileRecord>) -> Result<usize> {
        self.require(SessionState::Idle)?;
        let count = records.len();
        self.candidates = records;
        if count > 0 {
            self.state = SessionState::Confirming;
        }
        Ok(count)
    }

    /// The caller declined; back to `Idle`, nothing touched.
    pub fn decline(&mut self) -> Result<()> {
        self.require(SessionState::Confirming)?;
        self.candidates.clear();
        self.state = SessionState::Idle;
        Ok(())
    }

    /// The caller authorized deletion. Moves to `Executing` and hands back
    /// the candidate list for the executor.
    pub fn confirm(&mut self) -> Result<Vec<FileRecord>> {
        self.require(SessionState::Confirming)?;
        self.state = SessionState::Executing;
        Ok(self.candidates.clone())
    }

    /// Marks the deletion batch as finished.
    pub fn complete(&mut self) -> Result<()> {
        self.require(SessionState::Executing)?;
        self.state = SessionState::Completed;
        Ok(())
    }

    /// Confirms and runs the whole batch on the calling thread.
    pub fn execute(
        &mut self,
        mode: DeleteMode,
        trash: &dyn TrashProvider,
        events: &dyn EventSink,
        dry_run: bool,
    ) -> Result<DeletionSummary> {
        let candidates = self.confirm()?;
        let executor = DeletionExecutor::new(trash, events).dry_run(dry_run);
        let result = executor.execute_with_cancel(&candidates, mode, &self.cancel);
        self.state = SessionState::Completed;
        result
    }

    /// Clears the session after the summary has been consumed.
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.state = SessionState::Idle;
        self.cancel = CancelFlag::new();
    }

    fn require(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(FcleanError::InvalidState {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }
}

impl Default for CleanSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a scan running on a worker thread.
pub struct ScanTask {
    events: mpsc::UnboundedReceiver<AuditEvent>,
    result: oneshot::Receiver<Result<Vec<FileRecord>>>,
    cancel: CancelFlag,
}

impl ScanTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Blocks for the next progress event; `None` once the worker has
    /// finished emitting.
    pub fn next_event(&mut self) -> Option<AuditEvent> {
        self.events.blocking_recv()
    }

    /// Blocks until the scan result is available.
    pub fn wait(self) -> Result<Vec<FileRecord>> {
        self.result
            .blocking_recv()
            .map_err(|_| FcleanError::TaskFailed("scan worker exited without a result".into()))?
    }
}

/// Handle to a deletion batch running on a worker thread.
pub struct DeletionTask {
    events: mpsc::UnboundedReceiver<AuditEvent>,
    result: oneshot::Receiver<Result<DeletionSummary>>,
    cancel: CancelFlag,
}

impl DeletionTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn next_event(&mut self) -> Option<AuditEvent> {
        self.events.blocking_recv()
    }

    pub fn wait(self) -> Result<DeletionSummary> {
        self.result
            .blocking_recv()
            .map_err(|_| FcleanError::TaskFailed("deletion worker exited without a result".into()))?
    }
}

/// Runs scans and deletion batches off the interactive thread.
///
/// Workers run via `spawn_blocking`; progress events stream back over an
/// unbounded channel and the result arrives on a oneshot, so a frontend
/// can poll or block as it likes.
pub struct BackgroundRunner {
    runtime: tokio::runtime::Runtime,
}

impl BackgroundRunner {
    pub fn new() -> Self {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        Self { runtime }
    }

    /// Scans `request` against a snapshot of the whitelist.
    pub fn spawn_scan(
        &self,
        request: ScanRequest,
        whitelist: WhitelistSet,
        cancel: CancelFlag,
    ) -> ScanTask {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();
        let worker_cancel = cancel.clone();

        self.runtime.spawn_blocking(move || {
            let sink = ChannelSink::new(event_tx);
            let result = scanner::scan_with_cancel(&request, &whitelist, &sink, &worker_cancel);
            let _ = result_tx.send(result);
        });

        ScanTask {
            events: event_rx,
            result: result_rx,
            cancel,
        }
    }

    /// Deletes `candidates` using the system trash for reversible mode.
    pub fn spawn_deletion(
        &self,
        candidates: Vec<FileRecord>,
        mode: DeleteMode,
        dry_run: bool,
        cancel: CancelFlag,
    ) -> DeletionTask {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();
        let worker_cancel = cancel.clone();

        self.runtime.spawn_blocking(move || {
            let sink = ChannelSink::new(event_tx);
            let executor = DeletionExecutor::new(&SystemTrash, &sink).dry_run(dry_run);
            let result = executor.execute_with_cancel(&candidates, mode, &worker_cancel);
            let _ = result_tx.send(result);
        });

        DeletionTask {
            events: event_rx,
            result: result_rx,
            cancel,
        }
    }
}

impl Default for BackgroundRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScanMode;
    use crate::events::MemorySink;
    use std::fs;
    use tempfile::TempDir;

    fn no_ext_request(root: &std::path::Path) -> ScanRequest {
        ScanRequest {
            root: root.to_path_buf(),
            mode: ScanMode::NoExtension {
                include_hidden: false,
            },
            recursive: true,
        }
    }

    mod state_machine_tests {
        use super::*;

        #[test]
        fn test_scan_with_candidates_moves_to_confirming() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("loose"), b"x").unwrap();

            let mut session = CleanSession::new();
            let count = session
                .scan(&no_ext_request(temp_dir.path()), &MemorySink::new())
                .unwrap();

            assert_eq!(count, 1);
            assert_eq!(session.state(), SessionState::Confirming);
            assert_eq!(session.total_size_bytes(), 1);
        }

        #[test]
        fn test_empty_scan_stays_idle() {
            let temp_dir = TempDir::new().unwrap();

            let mut session = CleanSession::new();
            let count = session
                .scan(&no_ext_request(temp_dir.path()), &MemorySink::new())
                .unwrap();

            assert_eq!(count, 0);
            assert_eq!(session.state(), SessionState::Idle);
        }

        #[test]
        fn test_decline_returns_to_idle_without_touching_files() {
            let temp_dir = TempDir::new().unwrap();
            let file = temp_dir.path().join("loose");
            fs::write(&file, b"x").unwrap();

            let mut session = CleanSession::new();
            session
                .scan(&no_ext_request(temp_dir.path()), &MemorySink::new())
                .unwrap();
            session.decline().unwrap();

            assert_eq!(session.state(), SessionState::Idle);
            assert!(session.candidates().is_empty());
            assert!(file.exists());
        }

        #[test]
        fn test_execute_runs_batch_and_completes() {
            let temp_dir = TempDir::new().unwrap();
            let file = temp_dir.path().join("loose");
            fs::write(&file, b"x").unwrap();

            let mut session = CleanSession::new();
            session
                .scan(&no_ext_request(temp_dir.path()), &MemorySink::new())
                .unwrap();

            let summary = session
                .execute(
                    DeleteMode::Permanent,
                    &SystemTrash,
                    &MemorySink::new(),
                    false,
                )
                .unwrap();

            assert_eq!(summary.success_count, 1);
            assert_eq!(session.state(), SessionState::Completed);
            assert!(!file.exists());

            session.reset();
            assert_eq!(session.state(), SessionState::Idle);
            assert!(session.candidates().is_empty());
        }

        #[test]
        fn test_confirm_without_scan_is_an_error() {
            let mut session = CleanSession::new();
            let result = session.confirm();
            assert!(matches!(result, Err(FcleanError::InvalidState { .. })));
        }

        #[test]
        fn test_scan_is_not_reentrant_while_confirming() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("loose"), b"x").unwrap();

            let mut session = CleanSession::new();
            session
                .scan(&no_ext_request(temp_dir.path()), &MemorySink::new())
                .unwrap();

            let again = session.scan(&no_ext_request(temp_dir.path()), &MemorySink::new());
            assert!(matches!(again, Err(FcleanError::InvalidState { .. })));
        }

        #[test]
        fn test_custom_whitelist_entries_apply_to_session_scans() {
            let temp_dir = TempDir::new().unwrap();
            let shielded = temp_dir.path().join("precious");
            fs::create_dir(&shielded).unwrap();
            fs::write(shielded.join("data"), b"x").unwrap();
            fs::write(temp_dir.path().join("loose"), b"x").unwrap();

            let mut session = CleanSession::new();
            assert_eq!(session.add_whitelist_entry("precious"), AddEntry::Added);
            assert_eq!(session.add_whitelist_entry("precious"), AddEntry::Duplicate);

            let count = session
                .scan(&no_ext_request(temp_dir.path()), &MemorySink::new())
                .unwrap();
            assert_eq!(count, 1);
            assert_eq!(session.candidates()[0].name, "loose");
        }
    }

    mod background_tests {
        use super::*;

        #[test]
        fn test_background_scan_streams_events_then_result() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("loose"), b"x").unwrap();

            let runner = BackgroundRunner::new();
            let mut task = runner.spawn_scan(
                no_ext_request(temp_dir.path()),
                WhitelistSet::with_defaults(),
                CancelFlag::new(),
            );

            let mut messages = Vec::new();
            while let Some(event) = task.next_event() {
                messages.push(event.message);
            }
            let records = task.wait().unwrap();

            assert_eq!(records.len(), 1);
            assert!(messages.iter().any(|m| m.starts_with("scan started")));
            assert!(messages.iter().any(|m| m.contains("scan complete")));
        }

        #[test]
        fn test_background_deletion_round_trip() {
            let temp_dir = TempDir::new().unwrap();
            let file = temp_dir.path().join("loose");
            fs::write(&file, b"x").unwrap();

            let mut session = CleanSession::new();
            session
                .scan(&no_ext_request(temp_dir.path()), &MemorySink::new())
                .unwrap();
            let candidates = session.confirm().unwrap();

            let runner = BackgroundRunner::new();
            let mut task = runner.spawn_deletion(
                candidates,
                DeleteMode::Permanent,
                false,
                session.cancel_flag(),
            );
            while task.next_event().is_some() {}
            let summary = task.wait().unwrap();
            session.complete().unwrap();

            assert_eq!(summary.success_count, 1);
            assert_eq!(session.state(), SessionState::Completed);
            assert!(!file.exists());
        }

        #[test]
        fn test_pre_cancelled_background_scan_returns_empty() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("loose"), b"x").unwrap();

            let runner = BackgroundRunner::new();
            let cancel = CancelFlag::new();
            cancel.cancel();

            let task = runner.spawn_scan(
                no_ext_request(temp_dir.path()),
                WhitelistSet::with_defaults(),
                cancel,
            );
            let records = task.wait().unwrap();
            assert!(records.is_empty());
        }
    }
}
