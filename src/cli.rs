// CLI module for argument parsing and configuration

use crate::domain::{DeleteMode, ScanMode, ScanRequest};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Fclean - remove unwanted files from a directory tree
///
/// Scans for files by extension, or sweeps up extension-less strays, while
/// keeping well-known system directories out of reach.
#[derive(Parser, Debug, Clone)]
#[command(name = "fclean")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to scan
    ///
    /// If not specified, defaults to the current directory.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Extensions to match, comma separated (e.g. ".txt,.log")
    ///
    /// Matching is literal and case-sensitive. Extension scans only look
    /// at the root directory's direct children. When neither --ext nor
    /// --no-ext is given, the configured default extension list is used.
    #[arg(short = 'e', long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Sweep extension-less files instead of matching extensions
    #[arg(long = "no-ext", action = ArgAction::SetTrue)]
    pub no_extension: bool,

    /// Recurse into subdirectories (only with --no-ext)
    #[arg(short = 'r', long = "recursive", action = ArgAction::SetTrue)]
    pub recursive: bool,

    /// Include hidden files (only with --no-ext)
    #[arg(long = "hidden", action = ArgAction::SetTrue)]
    pub include_hidden: bool,

    /// Delete permanently instead of moving files to the trash
    #[arg(long = "permanent", action = ArgAction::SetTrue)]
    pub permanent: bool,

    /// Add a directory name to the protected whitelist (persisted)
    #[arg(long = "protect")]
    pub protect: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes", action = ArgAction::SetTrue)]
    pub assume_yes: bool,

    /// Dry run mode - report what would be deleted without touching files
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }

        if !self.directory.is_dir() {
            return Err(format!(
                "Path is not a directory: {}",
                self.directory.display()
            ));
        }

        if self.no_extension && !self.extensions.is_empty() {
            return Err("--ext and --no-ext cannot be combined".to_string());
        }

        if !self.no_extension && self.recursive {
            return Err("--recursive only applies to --no-ext scans".to_string());
        }

        if !self.no_extension && self.include_hidden {
            return Err("--hidden only applies to --no-ext scans".to_string());
        }

        if self.extensions.iter().any(|e| e.trim().is_empty()) {
            return Err("Extension list contains an empty entry".to_string());
        }

        Ok(())
    }

    /// Builds the scan request, substituting `fallback_extensions` when no
    /// extension list was given on the command line.
    pub fn scan_request(&self, fallback_extensions: &[String]) -> ScanRequest {
        let mode = if self.no_extension {
            ScanMode::NoExtension {
                include_hidden: self.include_hidden,
            }
        } else if self.extensions.is_empty() {
            ScanMode::Extensions(fallback_extensions.to_vec())
        } else {
            ScanMode::Extensions(self.extensions.clone())
        };

        ScanRequest {
            root: self.directory.clone(),
            mode,
            recursive: self.recursive,
        }
    }

    /// Trash unless the user explicitly asked for permanent removal.
    pub fn delete_mode(&self) -> DeleteMode {
        if self.permanent {
            DeleteMode::Permanent
        } else {
            DeleteMode::Trash
        }
    }
}
