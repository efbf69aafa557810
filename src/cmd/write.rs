//! Apply index note actions to the vault on disk

use std::fs;

use folder_index::util::display_path;
use folder_index::vault::split_path;
use folder_index::{Error, IndexNoteAction, Result, VaultContext};

pub fn apply(ctx: &VaultContext, action: &IndexNoteAction) -> Result<()> {
    match action {
        IndexNoteAction::CreateIndex { path, content } => {
            let disk = ctx.disk_path(path)?;
            if disk.exists() {
                let (folder, _) = split_path(path);
                return Err(Error::Conflict { from: folder.to_string(), to: path.clone() });
            }
            fs::write(&disk, content)?;
            println!("Created {}", display_path(&disk));
        }
        IndexNoteAction::RenameIndex { from, to } => {
            let src = ctx.disk_path(from)?;
            let dst = ctx.disk_path(to)?;
            if dst.exists() {
                return Err(Error::Conflict { from: from.clone(), to: to.clone() });
            }
            fs::rename(&src, &dst)?;
            println!("Renamed {} -> {}", from, to);
        }
    }
    Ok(())
}
