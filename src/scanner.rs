//! Directory traversal and candidate collection
//!
//! The scanner walks a root directory, consults the whitelist before
//! touching anything inside a directory, applies the scan mode to each
//! file, and returns snapshot records in a deterministic order: entries
//! within a directory are processed lexicographically by name, depth-first.

use crate::domain::{is_hidden, FileRecord, ScanMode, ScanRequest};
use crate::error::{FcleanError, Result};
use crate::events::{AuditEvent, EventSink};
use crate::session::CancelFlag;
use crate::whitelist::WhitelistSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Runs a full scan, returning every candidate under the request root.
///
/// Fails only when the root itself is missing or unreadable. Unreadable
/// subdirectories are skipped with a warning event; files that vanish
/// between listing and stat are silently omitted.
pub fn scan(
    request: &ScanRequest,
    whitelist: &WhitelistSet,
    events: &dyn EventSink,
) -> Result<Vec<FileRecord>> {
    scan_with_cancel(request, whitelist, events, &CancelFlag::new())
}

/// Like [`scan`], stopping between files once `cancel` is set.
pub fn scan_with_cancel(
    request: &ScanRequest,
    whitelist: &WhitelistSet,
    events: &dyn EventSink,
    cancel: &CancelFlag,
) -> Result<Vec<FileRecord>> {
    events.emit(AuditEvent::info(format!(
        "scan started: {}",
        request.root.display()
    )));

    let walker = Walker {
        mode: &request.mode,
        // Extension scans stay flat regardless of the recursive flag
        recurse: matches!(request.mode, ScanMode::NoExtension { .. }) && request.recursive,
        whitelist,
        events,
        cancel,
    };

    let mut records = Vec::new();

    if whitelist.is_protected(&request.root) {
        events.emit(AuditEvent::warning(format!(
            "root directory is whitelisted, nothing scanned: {}",
            request.root.display()
        )));
    } else {
        let entries = read_sorted(&request.root).map_err(|source| FcleanError::RootUnavailable {
            path: request.root.clone(),
            source,
        })?;
        walker.visit(entries, &mut records);
    }

    if cancel.is_cancelled() {
        events.emit(AuditEvent::warning(format!(
            "scan cancelled after {} candidates",
            records.len()
        )));
    } else {
        events.emit(AuditEvent::info(format!(
            "scan complete: {} candidates",
            records.len()
        )));
    }

    Ok(records)
}

struct Walker<'a> {
    mode: &'a ScanMode,
    recurse: bool,
    whitelist: &'a WhitelistSet,
    events: &'a dyn EventSink,
    cancel: &'a CancelFlag,
}

impl Walker<'_> {
    /// Processes one directory's worth of already-sorted entries.
    fn visit(&self, entries: Vec<PathBuf>, records: &mut Vec<FileRecord>) {
        for path in entries {
            if self.cancel.is_cancelled() {
                return;
            }

            // Race-deleted between listing and stat: omit and move on
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if metadata.is_dir() {
                if self.recurse {
                    self.descend(&path, records);
                }
                continue;
            }

            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };

            if self.mode.matches(name, is_hidden(name, &metadata)) {
                if let Ok(record) = FileRecord::from_path(&path) {
                    records.push(record);
                }
            }
        }
    }

    /// Enters a subdirectory, checking the whitelist before reading it.
    fn descend(&self, dir: &Path, records: &mut Vec<FileRecord>) {
        if self.whitelist.is_protected(dir) {
            self.events.emit(AuditEvent::info(format!(
                "skipping whitelisted directory: {}",
                dir.display()
            )));
            return;
        }

        match read_sorted(dir) {
            Ok(entries) => self.visit(entries, records),
            Err(err) => {
                self.events.emit(AuditEvent::warning(format!(
                    "skipping unreadable directory: {}: {}",
                    dir.display(),
                    err
                )));
            }
        }
    }
}

fn read_sorted(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}
