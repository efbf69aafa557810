//! Index note lifecycle
//!
//! Plans the two writes the index-note workflow performs on the vault:
//! - creating the index note of a new folder
//! - renaming a folder's index note after the folder itself was renamed
//!
//! Planning never writes. The caller applies the returned action to its
//! vault (disk, host API or [`VaultSnapshot`](crate::vault::VaultSnapshot)).

use crate::constants as C;
use crate::error::{Error, Result};
use crate::index_file::IndexFileResolver;
use crate::path_matcher::PathMatcher;
use crate::settings::SettingsSnapshot;
use crate::vault::{join_path, split_path, FolderNode, VaultTree};

/// A write to perform on the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexNoteAction {
    CreateIndex { path: String, content: String },
    RenameIndex { from: String, to: String },
}

/// Where the index note of `folder_path` lives
pub fn index_path(folder_path: &str, settings: &SettingsSnapshot) -> String {
    if folder_path.is_empty() {
        return settings.root_index_file.clone();
    }
    if settings.use_custom_index_name {
        return join_path(folder_path, &settings.custom_index_name);
    }
    let (_, name) = split_path(folder_path);
    join_path(folder_path, &format!("{}.{}", name, C::MARKDOWN_EXTENSION))
}

/// Initial content of a folder's index note
pub fn initial_content(folder_path: &str, settings: &SettingsSnapshot) -> String {
    let (_, name) = split_path(folder_path);
    settings.index_file_init_text.replace(C::FOLDER_PLACEHOLDER, name)
}

/// Plan the index note for a newly created folder
///
/// Yields nothing when auto-create is off, the folder is excluded, or it
/// already has an index note.
pub fn plan_create<T: VaultTree + ?Sized>(
    vault: &T,
    folder_path: &str,
    settings: &SettingsSnapshot,
) -> Result<Option<IndexNoteAction>> {
    if !settings.auto_create_index_file {
        return Ok(None);
    }
    let matcher = PathMatcher::new(settings);
    if matcher.is_folder_excluded(folder_path) {
        return Ok(None);
    }
    let resolver = IndexFileResolver::new(settings, &matcher);
    if resolver.index_of(vault, &FolderNode::from_path(folder_path)).is_some() {
        return Ok(None);
    }

    let path = index_path(folder_path, settings);
    if vault.resolve(&path).is_some() {
        log::warn!("cannot create index note {}: path is taken", path);
        return Err(Error::Conflict {
            from: folder_path.to_string(),
            to: path,
        });
    }
    Ok(Some(IndexNoteAction::CreateIndex {
        content: initial_content(folder_path, settings),
        path,
    }))
}

/// Plan the index note rename after a folder moved from `old_path` to `new_path`
///
/// `vault` must already reflect the folder rename. Yields nothing when
/// auto-rename is off, custom index names are in use, the folder name did
/// not change, `new_path` is not a folder, or the folder had no index note
/// under its old name. Fails with [`Error::Conflict`] when the new index
/// name is already taken.
pub fn plan_rename<T: VaultTree + ?Sized>(
    vault: &T,
    old_path: &str,
    new_path: &str,
    settings: &SettingsSnapshot,
) -> Result<Option<IndexNoteAction>> {
    if !settings.auto_rename_index_file || settings.use_custom_index_name {
        return Ok(None);
    }
    let (_, old_name) = split_path(old_path);
    let (_, new_name) = split_path(new_path);
    if old_name == new_name || new_path.is_empty() {
        return Ok(None);
    }
    if !matches!(vault.resolve(new_path), Some(entry) if entry.as_folder().is_some()) {
        return Ok(None);
    }

    let from = join_path(new_path, &format!("{}.{}", old_name, C::MARKDOWN_EXTENSION));
    if vault.resolve(&from).is_none() {
        return Ok(None);
    }
    let to = index_path(new_path, settings);
    if vault.resolve(&to).is_some() {
        log::warn!("cannot rename index note {} to {}: target exists", from, to);
        return Err(Error::Conflict { from, to });
    }
    Ok(Some(IndexNoteAction::RenameIndex { from, to }))
}
