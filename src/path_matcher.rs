//! Path exclusion
//!
//! Three sources are unioned:
//! - `excludeFolders`: regular expressions matched against a folder path
//! - `excludePatterns`: wildcard patterns (`*` = any characters), case-insensitive
//! - local patterns from one directive's `ignore:` line, same wildcard rules
//!
//! A path is excluded when any of them matches.

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::settings::SettingsSnapshot;
use crate::vault::{split_path, Entry};

/// Compiled exclusion predicate for one render pass
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    folders: Vec<Regex>,
    patterns: Vec<Regex>,
}

impl PathMatcher {
    /// Build from the global settings only
    pub fn new(settings: &SettingsSnapshot) -> Self {
        Self::with_local(settings, &[])
    }

    /// Build from the global settings plus invocation-local wildcard patterns
    ///
    /// Folder entries that are not valid regular expressions are logged and
    /// skipped so a bad setting never aborts a render.
    pub fn with_local(settings: &SettingsSnapshot, local: &[String]) -> Self {
        let folders = settings
            .exclude_folders
            .iter()
            .filter(|entry| !entry.trim().is_empty())
            .filter_map(|entry| match folder_regex(entry) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::warn!("{}", e);
                    None
                }
            })
            .collect();

        let patterns = settings
            .exclude_patterns
            .iter()
            .chain(local.iter())
            .filter(|p| !p.trim().is_empty())
            .filter_map(|p| wildcard_regex(p.trim()).ok())
            .collect();

        Self { folders, patterns }
    }

    /// Like [`PathMatcher::new`] but fails on the first invalid folder entry
    pub fn strict(settings: &SettingsSnapshot) -> Result<Self> {
        let folders = settings
            .exclude_folders
            .iter()
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| folder_regex(entry))
            .collect::<Result<Vec<_>>>()?;
        let mut matcher = Self::new(settings);
        matcher.folders = folders;
        Ok(matcher)
    }

    /// Whether a document path is excluded
    ///
    /// Folder entries are tested against the document's parent folder.
    pub fn is_excluded(&self, path: &str) -> bool {
        let (parent, _) = split_path(path);
        self.folder_rule_matches(parent) || self.pattern_matches(path)
    }

    /// Whether a folder path is excluded
    pub fn is_folder_excluded(&self, folder_path: &str) -> bool {
        if self.folder_rule_matches(folder_path) {
            return true;
        }
        // "Archive/*" also covers the folder "Archive" itself
        self.pattern_matches(&format!("{}/", folder_path))
    }

    /// Dispatch on the entry kind
    pub fn is_entry_excluded(&self, entry: &Entry) -> bool {
        match entry {
            Entry::Document(doc) => self.is_excluded(&doc.path),
            Entry::Folder(folder) => self.is_folder_excluded(&folder.path),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.patterns.is_empty()
    }

    fn folder_rule_matches(&self, folder_path: &str) -> bool {
        if self.folders.is_empty() {
            return false;
        }
        let candidate = format!("{}/", folder_path);
        self.folders.iter().any(|re| re.is_match(&candidate))
    }

    fn pattern_matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }
}

/// `^(?:entry)/?$`
fn folder_regex(entry: &str) -> Result<Regex> {
    let entry = entry.trim();
    Regex::new(&format!("^(?:{})/?$", entry)).map_err(|source| Error::InvalidPattern {
        pattern: entry.to_string(),
        source,
    })
}

/// Escape everything but `*`, which becomes `.*`
pub fn wildcard_to_regex(pattern: &str) -> String {
    pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

fn wildcard_regex(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&wildcard_to_regex(pattern))
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Split a comma-separated `ignore:` value into patterns
pub fn parse_local_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
