//! In-memory vault
//!
//! `VaultSnapshot` keeps the folder hierarchy in host order together with
//! each document's metadata. It implements both [`VaultTree`] and
//! [`MetadataIndex`], and supports the create/rename/delete mutations a host
//! performs before it emits a [`VaultEvent`](super::VaultEvent).

use std::collections::BTreeMap;

use super::{
    join_path, normalize_path, split_path, DocumentNode, Entry, FolderNode, HeadingRecord,
    LinkRecord, MetadataIndex, TagRecord, VaultTree,
};
use crate::constants as C;
use crate::error::{Error, Result};

/// Metadata the host extracted from one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub headings: Vec<HeadingRecord>,
    pub links: Vec<LinkRecord>,
    pub tags: Vec<TagRecord>,
    pub embeds: Vec<LinkRecord>,
    pub title: Option<String>,
}

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a heading; offsets increase in insertion order
    pub fn heading(mut self, level: u8, text: &str) -> Self {
        let offset = self.headings.last().map(|h| h.offset + 1).unwrap_or(0);
        self.headings.push(HeadingRecord::new(level, text, offset));
        self
    }

    pub fn link(mut self, target: &str) -> Self {
        self.links.push(LinkRecord::new(target));
        self
    }

    pub fn tag(mut self, label: &str) -> Self {
        self.tags.push(TagRecord::new(label));
        self
    }

    pub fn embed(mut self, target: &str) -> Self {
        self.embeds.push(LinkRecord::new(target));
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// In-memory vault: folder hierarchy plus per-document metadata
#[derive(Debug, Clone)]
pub struct VaultSnapshot {
    /// Folder path -> child paths in host order
    folders: BTreeMap<String, Vec<String>>,
    documents: BTreeMap<String, DocumentMetadata>,
}

impl Default for VaultSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultSnapshot {
    /// An empty vault holding only the root folder
    pub fn new() -> Self {
        let mut folders = BTreeMap::new();
        folders.insert(String::new(), Vec::new());
        Self {
            folders,
            documents: BTreeMap::new(),
        }
    }

    // === Building ===

    /// Add a folder (and any missing ancestors)
    pub fn add_folder(&mut self, path: &str) -> &mut Self {
        let path = normalize_path(path);
        self.ensure_folder(&path);
        self
    }

    /// Add or replace a document (creating missing ancestor folders)
    pub fn add_document(&mut self, path: &str, metadata: DocumentMetadata) -> &mut Self {
        let path = normalize_path(path);
        let (parent, _) = split_path(&path);
        let parent = parent.to_string();
        self.ensure_folder(&parent);
        if !self.documents.contains_key(&path) {
            self.push_child(&parent, &path);
        }
        self.documents.insert(path, metadata);
        self
    }

    /// Add a document without metadata
    pub fn add_file(&mut self, path: &str) -> &mut Self {
        self.add_document(path, DocumentMetadata::new())
    }

    fn ensure_folder(&mut self, path: &str) {
        if self.folders.contains_key(path) {
            return;
        }
        let (parent, _) = split_path(path);
        let parent = parent.to_string();
        self.ensure_folder(&parent);
        self.push_child(&parent, path);
        self.folders.insert(path.to_string(), Vec::new());
    }

    fn push_child(&mut self, folder: &str, child: &str) {
        if let Some(children) = self.folders.get_mut(folder) {
            children.push(child.to_string());
        }
    }

    /// Mutable access to a document's metadata
    pub fn metadata_mut(&mut self, path: &str) -> Option<&mut DocumentMetadata> {
        self.documents.get_mut(&normalize_path(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.folders.contains_key(&path) || self.documents.contains_key(&path)
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.folders.contains_key(&normalize_path(path))
    }

    // === Mutations ===

    /// Move a document or folder subtree to a new path
    ///
    /// Fails with [`Error::Conflict`] if the destination exists or lies inside
    /// the moved folder, and with [`Error::Unresolved`] if the source does not.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> Result<()> {
        let old_path = normalize_path(old_path);
        let new_path = normalize_path(new_path);

        if !self.contains(&old_path) || old_path.is_empty() {
            return Err(Error::unresolved(old_path));
        }
        let into_itself = new_path.starts_with(&format!("{}{}", old_path, C::PATH_SEPARATOR));
        if new_path.is_empty() || self.contains(&new_path) || into_itself {
            return Err(Error::Conflict {
                from: old_path,
                to: new_path,
            });
        }

        let (old_parent, _) = split_path(&old_path);
        let (new_parent, _) = split_path(&new_path);
        let (old_parent, new_parent) = (old_parent.to_string(), new_parent.to_string());
        self.ensure_folder(&new_parent);

        // Detach from the old parent, keeping the slot when the parent is unchanged
        let mut slot = None;
        if let Some(children) = self.folders.get_mut(&old_parent) {
            if let Some(pos) = children.iter().position(|c| *c == old_path) {
                children.remove(pos);
                slot = Some(pos);
            }
        }
        match (old_parent == new_parent, slot) {
            (true, Some(pos)) => {
                if let Some(children) = self.folders.get_mut(&new_parent) {
                    children.insert(pos, new_path.clone());
                }
            }
            _ => self.push_child(&new_parent, &new_path),
        }

        // Rebase every key and child reference under the moved path
        let folders = std::mem::take(&mut self.folders);
        self.folders = folders
            .into_iter()
            .map(|(path, children)| {
                let children = children
                    .into_iter()
                    .map(|c| rebase(&c, &old_path, &new_path))
                    .collect();
                (rebase(&path, &old_path, &new_path), children)
            })
            .collect();
        let documents = std::mem::take(&mut self.documents);
        self.documents = documents
            .into_iter()
            .map(|(path, meta)| (rebase(&path, &old_path, &new_path), meta))
            .collect();

        Ok(())
    }

    /// Remove a document or folder subtree; returns whether anything was removed
    pub fn delete(&mut self, path: &str) -> bool {
        let path = normalize_path(path);
        if path.is_empty() || !self.contains(&path) {
            return false;
        }
        let (parent, _) = split_path(&path);
        if let Some(children) = self.folders.get_mut(parent) {
            children.retain(|c| *c != path);
        }
        let prefix = format!("{}{}", path, C::PATH_SEPARATOR);
        self.folders
            .retain(|p, _| *p != path && !p.starts_with(&prefix));
        self.documents
            .retain(|p, _| *p != path && !p.starts_with(&prefix));
        true
    }

    fn entry_for(&self, path: &str) -> Entry {
        if self.folders.contains_key(path) {
            Entry::Folder(FolderNode::from_path(path))
        } else {
            Entry::Document(DocumentNode::from_path(path))
        }
    }

    /// Pick the best document for a bare link label
    fn find_by_label(&self, label: &str, from_path: &str) -> Option<String> {
        let (from_folder, _) = split_path(from_path);
        let with_ext = format!("{}.{}", label, C::MARKDOWN_EXTENSION);
        let candidates = [label, with_ext.as_str()];

        // Path relative to the linking document, then vault-absolute
        for candidate in candidates {
            let relative = join_path(from_folder, candidate);
            if self.documents.contains_key(&relative) {
                return Some(relative);
            }
            if self.documents.contains_key(candidate) {
                return Some(candidate.to_string());
            }
        }

        // Otherwise match by trailing path segments
        let mut matches: Vec<&String> = self
            .documents
            .keys()
            .filter(|path| {
                candidates.iter().any(|c| {
                    path.as_str() == *c || path.ends_with(&format!("{}{}", C::PATH_SEPARATOR, c))
                })
            })
            .collect();
        matches.sort_by(|a, b| {
            let a_local = split_path(a).0 == from_folder;
            let b_local = split_path(b).0 == from_folder;
            b_local
                .cmp(&a_local)
                .then_with(|| a.len().cmp(&b.len()))
                .then_with(|| a.cmp(b))
        });
        matches.first().map(|p| p.to_string())
    }
}

/// Replace the `old` prefix of `path` with `new`
fn rebase(path: &str, old: &str, new: &str) -> String {
    if path == old {
        return new.to_string();
    }
    match path.strip_prefix(old) {
        Some(rest) if rest.starts_with(C::PATH_SEPARATOR) => format!("{}{}", new, rest),
        _ => path.to_string(),
    }
}

/// Strip `|alias` and `#fragment` from a link label
pub fn link_path_of(label: &str) -> &str {
    let label = label.split('|').next().unwrap_or(label);
    let label = label.split(C::HEADING_SEPARATOR).next().unwrap_or(label);
    label.trim().trim_start_matches("./").trim_start_matches('/')
}

impl VaultTree for VaultSnapshot {
    fn root(&self) -> FolderNode {
        FolderNode::root()
    }

    fn children(&self, folder_path: &str) -> Vec<Entry> {
        self.folders
            .get(&normalize_path(folder_path))
            .map(|children| children.iter().map(|c| self.entry_for(c)).collect())
            .unwrap_or_default()
    }

    fn resolve(&self, path: &str) -> Option<Entry> {
        let path = normalize_path(path);
        if self.contains(&path) {
            Some(self.entry_for(&path))
        } else {
            None
        }
    }

    fn all_documents(&self) -> Vec<DocumentNode> {
        self.documents
            .keys()
            .map(|p| DocumentNode::from_path(p))
            .collect()
    }
}

impl MetadataIndex for VaultSnapshot {
    fn headings(&self, path: &str) -> Vec<HeadingRecord> {
        self.documents
            .get(path)
            .map(|m| m.headings.clone())
            .unwrap_or_default()
    }

    fn links(&self, path: &str) -> Vec<LinkRecord> {
        self.documents
            .get(path)
            .map(|m| m.links.clone())
            .unwrap_or_default()
    }

    fn tags(&self, path: &str) -> Vec<TagRecord> {
        self.documents
            .get(path)
            .map(|m| m.tags.clone())
            .unwrap_or_default()
    }

    fn embeds(&self, path: &str) -> Vec<LinkRecord> {
        self.documents
            .get(path)
            .map(|m| m.embeds.clone())
            .unwrap_or_default()
    }

    fn frontmatter_title(&self, path: &str) -> Option<String> {
        self.documents.get(path).and_then(|m| m.title.clone())
    }

    fn resolve_link_target(&self, label: &str, from_path: &str) -> Option<String> {
        let label = link_path_of(label);
        if label.is_empty() {
            return None;
        }
        self.find_by_label(label, from_path)
    }
}
