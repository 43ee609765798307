//! Protected-directory whitelist
//!
//! A whitelist entry is a single path component name. A path is protected
//! when any of its components equals an entry exactly, so `"AppData"`
//! shields `/home/x/AppData/y` and `/mnt/backup/AppData/z` alike.

use std::path::{Component, Path};

/// Directory names that are always protected, seeded into every session.
pub const DEFAULT_WHITELIST: [&str; 9] = [
    "Windows",
    "Program Files",
    "Program Files (x86)",
    "System32",
    "SysWOW64",
    "AppData",
    "ProgramData",
    "Users",
    "Documents and Settings",
];

/// Result of [`WhitelistSet::add_entry`]. Duplicates are reported to the
/// caller, not treated as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddEntry {
    Added,
    Duplicate,
}

/// Grows monotonically over a session; entries are never removed.
#[derive(Debug, Clone)]
pub struct WhitelistSet {
    entries: Vec<String>,
}

impl WhitelistSet {
    /// A set seeded with [`DEFAULT_WHITELIST`].
    pub fn with_defaults() -> Self {
        Self {
            entries: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// An empty set, protecting nothing.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Appends `name` unless an identical entry already exists.
    pub fn add_entry(&mut self, name: &str) -> AddEntry {
        if self.entries.iter().any(|e| e == name) {
            AddEntry::Duplicate
        } else {
            self.entries.push(name.to_string());
            AddEntry::Added
        }
    }

    /// True when any component of `path` equals an entry, case-sensitively.
    pub fn is_protected(&self, path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(part) => part
                .to_str()
                .is_some_and(|part| self.entries.iter().any(|e| e == part)),
            _ => false,
        })
    }
}

impl Default for WhitelistSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_protect_at_any_depth() {
        let set = WhitelistSet::with_defaults();
        assert!(set.is_protected(Path::new("/home/x/AppData/y")));
        assert!(set.is_protected(Path::new("/mnt/backup/AppData/z")));
        assert!(set.is_protected(Path::new("/Windows")));
        assert!(!set.is_protected(Path::new("/home/x/projects/y")));
    }

    #[test]
    fn test_match_is_whole_component_only() {
        let set = WhitelistSet::with_defaults();
        // Substring or prefix of a component is not a match
        assert!(!set.is_protected(Path::new("/home/AppDataBackup/y")));
        assert!(!set.is_protected(Path::new("/home/MyAppData/y")));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let set = WhitelistSet::with_defaults();
        assert!(!set.is_protected(Path::new("/home/appdata/y")));
        assert!(set.is_protected(Path::new("/home/AppData/y")));
    }

    #[test]
    fn test_add_entry_extends_protection() {
        let mut set = WhitelistSet::empty();
        let path = PathBuf::from("/srv/photos/2024");
        assert!(!set.is_protected(&path));

        assert_eq!(set.add_entry("photos"), AddEntry::Added);
        assert!(set.is_protected(&path));
        // Nothing else becomes protected
        assert!(!set.is_protected(Path::new("/srv/music/2024")));
    }

    #[test]
    fn test_add_entry_reports_duplicates() {
        let mut set = WhitelistSet::empty();
        assert_eq!(set.add_entry("cache"), AddEntry::Added);
        assert_eq!(set.add_entry("cache"), AddEntry::Duplicate);
        assert_eq!(set.entries().len(), 1);
    }

    #[test]
    fn test_empty_set_protects_nothing() {
        let set = WhitelistSet::empty();
        assert!(!set.is_protected(Path::new("/Windows/System32")));
    }
}
