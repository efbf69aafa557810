//! Create a folder's index note

use folder_index::index_note;
use folder_index::{scan_vault, Error, Result, VaultContext, VaultTree};

pub fn run(ctx: &VaultContext, folder: &str) -> Result<()> {
    let folder = ctx.vault_path(folder);
    let vault = scan_vault(&ctx.root)?;
    match vault.resolve(&folder) {
        Some(entry) if entry.as_folder().is_some() => {}
        _ if folder.is_empty() => {}
        _ => return Err(Error::unresolved(folder)),
    }

    match index_note::plan_create(&vault, &folder, &ctx.settings)? {
        Some(action) => super::write::apply(ctx, &action),
        None => {
            eprintln!("Nothing to do: '{}' already has an index note or is excluded", folder);
            Ok(())
        }
    }
}
