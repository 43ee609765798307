use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension-less file names that the OS plants in directories and that a
/// no-extension sweep must never pick up.
pub const SYSTEM_ARTIFACTS: [&str; 4] = ["Thumbs", "desktop", "DS_Store", "localized"];

/// One deletion candidate discovered by a scan.
///
/// Records are snapshots: size and modification time are read once at scan
/// time and never refreshed. A file that changes or disappears afterwards
/// shows up as a per-item error during deletion, not as a stale record.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        let modified_at: DateTime<Utc> = modified.into();

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(FileRecord {
            path: path.to_path_buf(),
            name,
            size_bytes: metadata.len(),
            modified_at,
        })
    }
}

/// What counts as a deletion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    /// Name ends with one of the given suffixes, compared literally and
    /// case-sensitively (".txt" does not match "a.TXT"). Only direct
    /// children of the scan root are considered.
    Extensions(Vec<String>),
    /// Base name contains no '.' and is not a known system artifact.
    /// Hidden files are skipped unless `include_hidden` is set.
    NoExtension { include_hidden: bool },
}

impl ScanMode {
    /// Applies the mode's rule to a single base name. `hidden` is the host
    /// filesystem's verdict for the file, see [`is_hidden`].
    pub fn matches(&self, name: &str, hidden: bool) -> bool {
        match self {
            ScanMode::Extensions(extensions) => {
                extensions.iter().any(|ext| name.ends_with(ext.as_str()))
            }
            ScanMode::NoExtension { include_hidden } => {
                !name.contains('.')
                    && !SYSTEM_ARTIFACTS.contains(&name)
                    && (*include_hidden || !hidden)
            }
        }
    }
}

/// Immutable input to a scan.
///
/// `recursive` only applies to [`ScanMode::NoExtension`]; extension scans
/// always stay in the root directory, mirroring flat-glob semantics.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub mode: ScanMode,
    pub recursive: bool,
}

/// Whether a file is hidden by the host platform's convention.
///
/// Unix: leading-dot names. Windows: the FILE_ATTRIBUTE_HIDDEN bit. The
/// metadata argument is only consulted on Windows.
#[cfg(unix)]
pub fn is_hidden(name: &str, _metadata: &fs::Metadata) -> bool {
    name.starts_with('.')
}

#[cfg(windows)]
pub fn is_hidden(_name: &str, metadata: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Move to the OS recycle bin; recoverable.
    Trash,
    /// Remove from the filesystem outright.
    Permanent,
}

impl std::fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteMode::Trash => write!(f, "trash"),
            DeleteMode::Permanent => write!(f, "permanent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionErrorKind {
    None,
    PermissionDenied,
    NotFound,
    Other,
}

/// Per-file result of a deletion attempt. Created once by the executor and
/// never mutated.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    pub path: PathBuf,
    pub succeeded: bool,
    pub error_kind: DeletionErrorKind,
    pub detail: String,
}

impl DeletionOutcome {
    pub fn success(path: PathBuf) -> Self {
        Self {
            path,
            succeeded: true,
            error_kind: DeletionErrorKind::None,
            detail: String::new(),
        }
    }

    pub fn failure(path: PathBuf, error_kind: DeletionErrorKind, detail: String) -> Self {
        Self {
            path,
            succeeded: false,
            error_kind,
            detail,
        }
    }
}

/// Aggregate of a deletion batch, outcomes in candidate order.
#[derive(Debug, Clone)]
pub struct DeletionSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionSummary {
    pub fn from_outcomes(outcomes: Vec<DeletionOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.succeeded).count();
        let error_count = outcomes.len() - success_count;
        Self {
            success_count,
            error_count,
            outcomes,
        }
    }
}
