//! Folder traversal for outlines
//!
//! Turns a folder's live children into the ordered, filtered items an
//! outline renders, one level at a time:
//! - excluded entries are dropped
//! - index notes are not listed as files (they stand in for their folder)
//! - subfolders are only kept in recursive mode
//! - each level is sorted before descending
//! - a subfolder always gets its own line; its contents are only walked
//!   while the depth is below the recursion limit

use std::collections::HashSet;

use crate::index_file::IndexFileResolver;
use crate::path_matcher::PathMatcher;
use crate::settings::SettingsSnapshot;
use crate::sort;
use crate::vault::{DocumentNode, Entry, FolderNode, VaultTree};

/// One entry of a traversed folder level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeItem {
    Document(DocumentNode),
    Folder {
        folder: FolderNode,
        /// The folder's index note, rendered as the folder line
        index: Option<DocumentNode>,
        /// Remaining children, empty when `truncated`
        children: Vec<TreeItem>,
        /// The recursion limit stopped the walk at this folder
        truncated: bool,
    },
}

/// Walks folder children into [`TreeItem`]s
pub struct FolderTreeBuilder<'a, T: VaultTree + ?Sized> {
    vault: &'a T,
    settings: &'a SettingsSnapshot,
    matcher: &'a PathMatcher,
    recursion_limit: Option<usize>,
}

impl<'a, T: VaultTree + ?Sized> FolderTreeBuilder<'a, T> {
    pub fn new(vault: &'a T, settings: &'a SettingsSnapshot, matcher: &'a PathMatcher) -> Self {
        Self {
            vault,
            settings,
            matcher,
            recursion_limit: settings.recursion_limit,
        }
    }

    /// Override the recursion limit for this invocation (`None` = unlimited)
    pub fn recursion_limit(mut self, limit: Option<usize>) -> Self {
        self.recursion_limit = limit;
        self
    }

    fn resolver(&self) -> IndexFileResolver<'a> {
        IndexFileResolver::new(self.settings, self.matcher)
    }

    /// Build the items for one folder's children
    pub fn build(&self, children: &[Entry]) -> Vec<TreeItem> {
        let mut visited = HashSet::new();
        self.build_level(children, 0, &mut visited)
    }

    fn build_level(&self, children: &[Entry], depth: usize, visited: &mut HashSet<String>) -> Vec<TreeItem> {
        let mut entries: Vec<&Entry> = children
            .iter()
            .filter(|e| self.settings.recursive || e.as_document().is_some())
            .collect();
        sort::sort_by_name(&mut entries, self.settings.sort_files, |e| e.name());

        let resolver = self.resolver();
        let mut items = Vec::with_capacity(entries.len());

        for entry in entries {
            if self.matcher.is_entry_excluded(entry) {
                continue;
            }
            match entry {
                Entry::Document(doc) => {
                    if resolver.is_index_file(&doc.path) {
                        continue;
                    }
                    items.push(TreeItem::Document(doc.clone()));
                }
                Entry::Folder(folder) => {
                    if !visited.insert(folder.path.clone()) {
                        log::debug!("folder {} already visited, skipping", folder.path);
                        continue;
                    }
                    items.push(self.build_folder(folder, depth, visited));
                }
            }
        }

        items
    }

    fn build_folder(&self, folder: &FolderNode, depth: usize, visited: &mut HashSet<String>) -> TreeItem {
        let all_children = self.vault.children(&folder.path);
        let index = self.resolver().index_among(&all_children);

        let within_limit = self.recursion_limit.map_or(true, |limit| depth < limit);
        let children = if within_limit {
            let remaining: Vec<Entry> = all_children
                .into_iter()
                .filter(|c| Some(c.path()) != index.as_ref().map(|i| i.path.as_str()))
                .collect();
            self.build_level(&remaining, depth + 1, visited)
        } else {
            Vec::new()
        };

        TreeItem::Folder {
            folder: folder.clone(),
            index,
            children,
            truncated: !within_limit,
        }
    }
}
