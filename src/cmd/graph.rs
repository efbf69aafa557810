//! Print the folder-aware graph

use folder_index::{scan_vault, GraphModelBuilder, RenderOptions, Result, VaultContext};

pub fn run(ctx: &VaultContext, active: Option<&str>, options: &RenderOptions) -> Result<()> {
    let vault = scan_vault(&ctx.root)?;
    let active = active.map(|path| ctx.vault_path(path));
    let graph = GraphModelBuilder::new(&vault, &vault, &ctx.settings).build(active.as_deref(), options);

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&graph).unwrap_or_default());
        return Ok(());
    }

    println!("{} nodes, {} edges", graph.len(), graph.edge_count());
    for (id, node) in &graph.nodes {
        let kind = serde_json::to_value(node.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        if kind.is_empty() {
            println!("{}", id);
        } else {
            println!("{} [{}]", id, kind);
        }
        for target in &node.edges {
            println!("  -> {}", target);
        }
    }
    Ok(())
}
