//! Index note detection
//!
//! A folder's index note is the document that stands in for the folder in
//! outlines and in the graph: `Projects/Projects.md` for `Projects`, the
//! configured root index (`Dashboard.md`) for the vault root, or the custom
//! index name when that mode is enabled.

use crate::constants as C;
use crate::path_matcher::PathMatcher;
use crate::settings::SettingsSnapshot;
use crate::vault::{split_path, DocumentNode, Entry, FolderNode, VaultTree};

/// Decides which documents are index notes
#[derive(Debug, Clone, Copy)]
pub struct IndexFileResolver<'a> {
    settings: &'a SettingsSnapshot,
    matcher: &'a PathMatcher,
}

impl<'a> IndexFileResolver<'a> {
    pub fn new(settings: &'a SettingsSnapshot, matcher: &'a PathMatcher) -> Self {
        Self { settings, matcher }
    }

    /// Whether `path` is the index note of its parent folder
    pub fn is_index_file(&self, path: &str) -> bool {
        if self.matcher.is_excluded(path) {
            return false;
        }
        let (parent, file_name) = split_path(path);

        if parent.is_empty() {
            return file_name == self.settings.root_index_file;
        }
        if self.settings.use_custom_index_name && file_name == self.settings.custom_index_name {
            return true;
        }
        let (_, folder_name) = split_path(parent);
        file_name == format!("{}.{}", folder_name, C::MARKDOWN_EXTENSION)
    }

    /// Resolve the index note of `folder`
    ///
    /// The root is looked up directly by the configured root index name;
    /// other folders are searched among their children.
    pub fn index_of<T: VaultTree + ?Sized>(&self, vault: &T, folder: &FolderNode) -> Option<DocumentNode> {
        if folder.is_root {
            return match vault.resolve(&self.settings.root_index_file) {
                Some(Entry::Document(doc)) if self.is_index_file(&doc.path) => Some(doc),
                _ => None,
            };
        }
        self.index_among(&vault.children(&folder.path))
    }

    /// First index note among a folder's children
    pub fn index_among(&self, children: &[Entry]) -> Option<DocumentNode> {
        children
            .iter()
            .filter_map(Entry::as_document)
            .find(|doc| self.is_index_file(&doc.path))
            .cloned()
    }
}
