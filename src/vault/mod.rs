//! Vault model and the capabilities the renderers consume
//!
//! The host owns the document hierarchy and the per-document metadata.
//! Renderers only read them through two traits:
//! - [`VaultTree`] - folders, documents and path resolution
//! - [`MetadataIndex`] - headings, links, tags, embeds, frontmatter title
//!
//! [`VaultSnapshot`] implements both in memory; [`scan`] fills one from disk.

pub mod scan;
pub mod snapshot;

pub use snapshot::{DocumentMetadata, VaultSnapshot};

use crate::constants as C;

// === Nodes ===

/// One file in the vault
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNode {
    /// Vault-relative, slash-delimited path (unique)
    pub path: String,
    /// File name without extension
    pub basename: String,
    /// Extension without the dot (empty if none)
    pub extension: String,
    /// Path of the containing folder ("" for the root)
    pub parent_folder_path: String,
}

impl DocumentNode {
    /// Derive the node attributes from a vault path
    pub fn from_path(path: &str) -> Self {
        let (parent, name) = split_path(path);
        let (basename, extension) = match name.rfind('.') {
            Some(dot) if dot > 0 => (&name[..dot], &name[dot + 1..]),
            _ => (name, ""),
        };
        Self {
            path: path.to_string(),
            basename: basename.to_string(),
            extension: extension.to_string(),
            parent_folder_path: parent.to_string(),
        }
    }

    /// Last path segment, extension included
    pub fn name(&self) -> &str {
        split_path(&self.path).1
    }

    /// Whether the document is a markdown note (as opposed to an attachment)
    pub fn is_markdown(&self) -> bool {
        self.extension == C::MARKDOWN_EXTENSION
    }
}

/// One folder in the vault
///
/// Children are not stored on the node; ask the [`VaultTree`] for
/// `children(&folder.path)` so every read sees the live hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderNode {
    /// Vault-relative path ("" for the root)
    pub path: String,
    /// Last path segment ("" for the root)
    pub name: String,
    pub is_root: bool,
}

impl FolderNode {
    /// The vault root
    pub fn root() -> Self {
        Self {
            path: String::new(),
            name: String::new(),
            is_root: true,
        }
    }

    /// Derive a folder node from its path
    pub fn from_path(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self {
            path: path.to_string(),
            name: split_path(path).1.to_string(),
            is_root: false,
        }
    }
}

/// A child of a folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entry {
    Document(DocumentNode),
    Folder(FolderNode),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::Document(doc) => &doc.path,
            Entry::Folder(folder) => &folder.path,
        }
    }

    /// Name used for sorting: file name with extension, or folder name
    pub fn name(&self) -> &str {
        match self {
            Entry::Document(doc) => doc.name(),
            Entry::Folder(folder) => &folder.name,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentNode> {
        match self {
            Entry::Document(doc) => Some(doc),
            Entry::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Entry::Folder(folder) => Some(folder),
            Entry::Document(_) => None,
        }
    }
}

// === Metadata records ===

/// One heading as reported by the host, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRecord {
    pub text: String,
    /// 1..=6
    pub level: u8,
    /// Byte offset of the heading in the source document
    pub offset: usize,
}

impl HeadingRecord {
    pub fn new(level: u8, text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            level,
            offset,
        }
    }
}

/// An outgoing link or embed, as written (fragment and alias included)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub target: String,
}

impl LinkRecord {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// A tag, including the leading `#`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub label: String,
}

impl TagRecord {
    /// Normalise to `#label`
    pub fn new(label: &str) -> Self {
        Self {
            label: format!("#{}", label.trim_start_matches('#')),
        }
    }
}

/// Change notification delivered by the host after it mutated the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    Created { path: String },
    Renamed { old_path: String, new_path: String },
    Deleted { path: String },
}

// === Capabilities ===

/// Read access to the document hierarchy
pub trait VaultTree {
    /// The root folder
    fn root(&self) -> FolderNode;

    /// Children of a folder in host order; empty for unknown paths
    fn children(&self, folder_path: &str) -> Vec<Entry>;

    /// Look up a file or folder by exact path
    fn resolve(&self, path: &str) -> Option<Entry>;

    /// Every document in the vault, markdown and attachments
    fn all_documents(&self) -> Vec<DocumentNode>;
}

/// Read access to per-document metadata
pub trait MetadataIndex {
    /// Headings in document order
    fn headings(&self, path: &str) -> Vec<HeadingRecord>;

    fn links(&self, path: &str) -> Vec<LinkRecord>;

    fn tags(&self, path: &str) -> Vec<TagRecord>;

    fn embeds(&self, path: &str) -> Vec<LinkRecord>;

    /// `title` field of the document frontmatter
    fn frontmatter_title(&self, path: &str) -> Option<String>;

    /// Resolve a link label relative to the document containing it
    fn resolve_link_target(&self, label: &str, from_path: &str) -> Option<String>;
}

// === Path helpers ===

/// Split a vault path into (parent, last segment)
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind(C::PATH_SEPARATOR) {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    }
}

/// Join a folder path and a child name
pub fn join_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", folder, C::PATH_SEPARATOR, name)
    }
}

/// Normalise separators and strip leading/trailing slashes
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_path() {
        let doc = DocumentNode::from_path("Projects/Alpha/Alpha.md");
        assert_eq!(doc.basename, "Alpha");
        assert_eq!(doc.extension, "md");
        assert_eq!(doc.parent_folder_path, "Projects/Alpha");
        assert_eq!(doc.name(), "Alpha.md");
        assert!(doc.is_markdown());
    }

    #[test]
    fn test_document_at_root_without_extension() {
        let doc = DocumentNode::from_path("README");
        assert_eq!(doc.basename, "README");
        assert_eq!(doc.extension, "");
        assert_eq!(doc.parent_folder_path, "");
        assert!(!doc.is_markdown());
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        let doc = DocumentNode::from_path("a/.hidden");
        assert_eq!(doc.basename, ".hidden");
        assert_eq!(doc.extension, "");
    }

    #[test]
    fn test_folder_from_path() {
        assert!(FolderNode::from_path("").is_root);
        let folder = FolderNode::from_path("a/b");
        assert_eq!(folder.name, "b");
        assert!(!folder.is_root);
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(split_path("a/b/c.md"), ("a/b", "c.md"));
        assert_eq!(split_path("c.md"), ("", "c.md"));
        assert_eq!(join_path("", "c.md"), "c.md");
        assert_eq!(join_path("a", "c.md"), "a/c.md");
        assert_eq!(normalize_path("\\a\\b\\"), "a/b");
    }

    #[test]
    fn test_tag_record_normalises_hash() {
        assert_eq!(TagRecord::new("rust").label, "#rust");
        assert_eq!(TagRecord::new("#rust").label, "#rust");
    }
}
