//! Render every outline block embedded in a document

use std::fs;

use folder_index::constants as C;
use folder_index::markdown::find_code_blocks;
use folder_index::{scan_vault, OutlineDirective, OutlineRenderer, Result, VaultContext};

pub fn run(ctx: &VaultContext, document: &str) -> Result<()> {
    let document = ctx.vault_path(document);
    let content = fs::read_to_string(ctx.disk_path(&document)?)?;
    let blocks = find_code_blocks(&content, C::CODE_FENCE_NAME);
    if blocks.is_empty() {
        eprintln!("No {} block in {}", C::CODE_FENCE_NAME, document);
        return Ok(());
    }

    let vault = scan_vault(&ctx.root)?;
    let mut rendered = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let directive = OutlineDirective::parse(block);
        let outline = OutlineRenderer::new(&vault, &vault, &ctx.settings)
            .with_directive(&directive)
            .render_for_document(&document);
        rendered.push((directive, outline));
    }

    if ctx.json {
        let value: Vec<_> = rendered
            .iter()
            .map(|(directive, outline)| {
                serde_json::json!({
                    "title": directive.title,
                    "type": directive.kind,
                    "outline": outline,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return Ok(());
    }

    for (i, (directive, outline)) in rendered.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if let Some(title) = &directive.title {
            println!("{}", title);
        }
        println!("{}", outline);
    }
    Ok(())
}
