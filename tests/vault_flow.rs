//! End-to-end flow over a vault on disk: scan, outline, graph, index notes

use std::fs;
use std::path::Path;

use folder_index::constants as C;
use folder_index::index_note;
use folder_index::markdown::find_code_blocks;
use folder_index::{
    scan_vault, FolderIndexEngine, GraphModelBuilder, IndexNoteAction, OutlineDirective,
    OutlineRenderer, RenderOptions, SettingsSnapshot, VaultTree,
};

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}

fn library() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "Dashboard.md", "```folder-index-content\n```\n");
    write(
        root,
        "Books/Books.md",
        "---\ntags: MOCs\n---\n```folder-index-content\nignore: *draft*\n```\n",
    );
    write(root, "Books/Dune.md", "# Dune\n\n## Plot\n\nSee [[Foundation]].\n");
    write(root, "Books/Foundation.md", "# Foundation\n");
    write(root, "Books/draft-notes.md", "draft\n");
    write(root, ".obsidian/app.json", "{}");
    dir
}

#[test]
fn test_scan_skips_hidden_folders() {
    let dir = library();
    let vault = scan_vault(dir.path()).unwrap();
    assert!(vault.contains("Books/Dune.md"));
    assert!(vault.is_folder("Books"));
    assert!(vault.resolve(".obsidian").is_none());
}

#[test]
fn test_outline_from_embedded_block() {
    let dir = library();
    let vault = scan_vault(dir.path()).unwrap();
    let settings = SettingsSnapshot::default();

    let content = fs::read_to_string(dir.path().join("Books/Books.md")).unwrap();
    let blocks = find_code_blocks(&content, C::CODE_FENCE_NAME);
    assert_eq!(blocks.len(), 1);

    let directive = OutlineDirective::parse(&blocks[0]);
    let out = OutlineRenderer::new(&vault, &vault, &settings)
        .with_directive(&directive)
        .render_for_document("Books/Books.md");
    assert_eq!(
        out,
        "1. [[Books/Dune|Dune]]\n\
         \t1. [[Books/Dune#Plot|Plot]]\n\
         1. [[Books/Foundation|Foundation]]"
    );

    // Without the block's ignore list the draft shows up first
    let all = OutlineRenderer::new(&vault, &vault, &settings).render_for_document("Books/Books.md");
    assert!(all.starts_with("1. [[Books/draft-notes|draft-notes]]"));
}

#[test]
fn test_recursive_outline_from_root() {
    let dir = library();
    let vault = scan_vault(dir.path()).unwrap();
    let settings = SettingsSnapshot {
        recursive: true,
        recursion_limit: Some(0),
        ..SettingsSnapshot::default()
    };
    let out = OutlineRenderer::new(&vault, &vault, &settings).render_for_document("Dashboard.md");
    assert_eq!(out, "1. [[Books/Books|**Books**]]");
}

#[test]
fn test_graph_has_hierarchy_and_link_edges() {
    let dir = library();
    let vault = scan_vault(dir.path()).unwrap();
    let settings = SettingsSnapshot::default();

    let graph = GraphModelBuilder::new(&vault, &vault, &settings)
        .build(Some("Books/Dune.md"), &RenderOptions::default());

    assert!(graph.has_edge("Dashboard.md", "Books/Books.md"));
    assert!(graph.has_edge("Books/Books.md", "Books/Dune.md"));
    assert!(graph.has_edge("Books/Books.md", "Books/draft-notes.md"));
    assert!(graph.has_edge("Books/Dune.md", "Books/Foundation.md"));
    assert!(!graph.has_edge("Books/Foundation.md", "Books/Dune.md"));

    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(json["nodes"]["Books/Dune.md"]["type"], "focused");
}

#[test]
fn test_index_note_plans_on_disk_vault() {
    let dir = library();
    fs::create_dir(dir.path().join("Films")).unwrap();
    let vault = scan_vault(dir.path()).unwrap();
    let settings = SettingsSnapshot::default();

    let action = index_note::plan_create(&vault, "Films", &settings).unwrap();
    assert_eq!(
        action,
        Some(IndexNoteAction::CreateIndex {
            path: "Films/Films.md".to_string(),
            content: C::DEFAULT_INDEX_INIT_TEXT.to_string(),
        })
    );
    assert_eq!(index_note::plan_create(&vault, "Books", &settings).unwrap(), None);

    fs::rename(dir.path().join("Books"), dir.path().join("Novels")).unwrap();
    let vault = scan_vault(dir.path()).unwrap();
    let action = index_note::plan_rename(&vault, "Books", "Novels", &settings).unwrap();
    assert_eq!(
        action,
        Some(IndexNoteAction::RenameIndex {
            from: "Novels/Books.md".to_string(),
            to: "Novels/Novels.md".to_string(),
        })
    );
}

#[test]
fn test_engine_keeps_outlines_live() {
    let dir = library();
    let vault = scan_vault(dir.path()).unwrap();
    let mut engine = FolderIndexEngine::new(vault, SettingsSnapshot::default());

    let id = engine.mount_outline("Books/Books.md", "ignore: *draft*");
    assert_eq!(
        engine.outline(id),
        Some("1. [[Books/Dune|Dune]]\n\t1. [[Books/Dune#Plot|Plot]]\n1. [[Books/Foundation|Foundation]]")
    );

    let actions = engine.write_document("Books/Hyperion.md", "# Hyperion\n").unwrap();
    assert!(actions.is_empty());
    assert_eq!(
        engine.outline(id),
        Some(
            "1. [[Books/Dune|Dune]]\n\t1. [[Books/Dune#Plot|Plot]]\n\
             1. [[Books/Foundation|Foundation]]\n1. [[Books/Hyperion|Hyperion]]"
        )
    );

    let actions = engine.create_folder("Books/Sci-Fi").unwrap();
    assert_eq!(actions.len(), 1);
    assert!(engine.vault().contains("Books/Sci-Fi/Sci-Fi.md"));

    engine.update_settings(SettingsSnapshot {
        recursive: true,
        ..SettingsSnapshot::default()
    });
    let out = engine.outline(id).unwrap();
    assert!(out.contains("1. [[Books/Sci-Fi/Sci-Fi|**Sci-Fi**]]"));
}
