//! Check whether a document is an index note

use folder_index::index_file::IndexFileResolver;
use folder_index::path_matcher::PathMatcher;
use folder_index::{Result, VaultContext};

pub fn run(ctx: &VaultContext, path: &str) -> Result<()> {
    let path = ctx.vault_path(path);
    let matcher = PathMatcher::new(&ctx.settings);
    let is_index = IndexFileResolver::new(&ctx.settings, &matcher).is_index_file(&path);

    if ctx.json {
        println!("{}", serde_json::json!({ "path": path, "isIndex": is_index }));
    } else {
        println!("{}", is_index);
    }
    Ok(())
}
