//! Print the outline of the folder containing a document

use folder_index::path_matcher::parse_local_patterns;
use folder_index::{scan_vault, OutlineDirective, OutlineRenderer, Result, VaultContext};

pub fn run(
    ctx: &VaultContext,
    document: &str,
    ignore: Option<&str>,
    recursion_limit: Option<i64>,
) -> Result<()> {
    let vault = scan_vault(&ctx.root)?;
    let document = ctx.vault_path(document);

    let directive = OutlineDirective {
        ignore: ignore.map(parse_local_patterns).unwrap_or_default(),
        recursion_limit: recursion_limit.map(|n| usize::try_from(n).ok()),
        ..Default::default()
    };
    let outline = OutlineRenderer::new(&vault, &vault, &ctx.settings)
        .with_directive(&directive)
        .render_for_document(&document);

    if ctx.json {
        let value = serde_json::json!({
            "document": document,
            "outline": outline,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else if !outline.is_empty() {
        println!("{}", outline);
    }
    Ok(())
}
