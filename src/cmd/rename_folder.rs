//! Rename a folder on disk, then its index note

use std::fs;

use folder_index::index_note;
use folder_index::{scan_vault, Error, Result, VaultContext};

pub fn run(ctx: &VaultContext, old: &str, new: &str) -> Result<()> {
    let old = ctx.vault_path(old);
    let new = ctx.vault_path(new);
    let from = ctx.disk_path(&old)?;
    let to = ctx.disk_path(&new)?;

    if !from.is_dir() {
        return Err(Error::unresolved(old));
    }
    if to.exists() {
        return Err(Error::Conflict { from: old, to: new });
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(&from, &to)?;
    println!("Renamed {} -> {}", old, new);

    // The folder move already happened; a conflict only skips the note
    let vault = scan_vault(&ctx.root)?;
    match index_note::plan_rename(&vault, &old, &new, &ctx.settings)? {
        Some(action) => super::write::apply(ctx, &action),
        None => Ok(()),
    }
}
