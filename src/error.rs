//! Error types shared across the crate

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FcleanError {
    /// The scan root is missing or cannot be opened. Fatal to the scan call.
    #[error("root directory unavailable: {path}: {source}")]
    RootUnavailable { path: PathBuf, source: io::Error },

    /// A deletion batch was started with no candidates.
    #[error("no candidates supplied for deletion")]
    EmptyBatch,

    /// A session operation was invoked in the wrong state.
    #[error("invalid session state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// A background task ended without delivering a result.
    #[error("background task failed: {0}")]
    TaskFailed(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FcleanError>;
