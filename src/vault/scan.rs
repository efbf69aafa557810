//! Build a [`VaultSnapshot`] from a directory on disk
//!
//! Hidden entries (dot-prefixed, e.g. `.obsidian`, `.git`) are skipped.
//! Children are added in file-name order so the host order is stable
//! across platforms.

use std::fs;
use std::path::Path;

use super::{join_path, DocumentMetadata, VaultSnapshot};
use crate::constants as C;
use crate::error::Result;
use crate::markdown;

/// Scan `root` recursively into an in-memory vault
pub fn scan_vault(root: &Path) -> Result<VaultSnapshot> {
    let mut vault = VaultSnapshot::new();
    scan_dir(root, "", &mut vault)?;
    Ok(vault)
}

fn scan_dir(dir: &Path, vault_path: &str, vault: &mut VaultSnapshot) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let child = join_path(vault_path, &name);

        let Ok(file_type) = entry.file_type() else {
            log::warn!("cannot stat {}", path.display());
            continue;
        };

        if file_type.is_dir() {
            vault.add_folder(&child);
            if let Err(e) = scan_dir(&path, &child, vault) {
                log::warn!("cannot read folder {}: {}", path.display(), e);
            }
        } else if is_markdown_file(&path) {
            vault.add_document(&child, read_metadata(&path));
        } else {
            vault.add_file(&child);
        }
    }

    Ok(())
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == C::MARKDOWN_EXTENSION)
        .unwrap_or(false)
}

/// Parse a markdown file; unreadable files keep their place with empty metadata
fn read_metadata(path: &Path) -> DocumentMetadata {
    match fs::read_to_string(path) {
        Ok(content) => markdown::parse_document(&content),
        Err(e) => {
            log::warn!("cannot read {}: {}", path.display(), e);
            DocumentMetadata::default()
        }
    }
}
