//! Folder-aware link graph
//!
//! Nodes are documents, tags and unresolved link labels. Edges come from:
//! - index notes, to every sibling document and to the index note of every
//!   sibling folder (folder hierarchy as edges)
//! - links and embeds, to the resolved document or the literal label
//! - tags, to a synthetic tag node
//!
//! The graph is rebuilt in full on every render.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants as C;
use crate::index_file::IndexFileResolver;
use crate::path_matcher::PathMatcher;
use crate::settings::SettingsSnapshot;
use crate::vault::{DocumentNode, Entry, MetadataIndex, VaultTree};

// === Graph ===

/// Display class of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[serde(rename = "")]
    Plain,
    Focused,
    Tag,
    Unresolved,
    Attachment,
}

/// Color annotation applied by the color pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    /// Rendered dimmed: the node failed every active query
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Target node ids
    #[serde(rename = "links")]
    pub edges: BTreeSet<String>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<NodeColor>,
}

impl GraphNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            edges: BTreeSet::new(),
            kind,
            color: None,
        }
    }
}

/// Node id -> node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: BTreeMap<String, GraphNode>,
}

impl Graph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Whether an edge `from -> to` exists
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.nodes
            .get(from)
            .map(|n| n.edges.contains(to))
            .unwrap_or(false)
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.edges.len()).sum()
    }

    /// Insert a synthetic node unless one already exists
    fn add_synthetic(&mut self, id: &str, kind: NodeKind) {
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| GraphNode::new(kind));
    }

    /// Remove edges pointing at ids that are not nodes
    pub fn drop_dangling_edges(&mut self) {
        let ids: BTreeSet<String> = self.nodes.keys().cloned().collect();
        for node in self.nodes.values_mut() {
            node.edges.retain(|target| ids.contains(target));
        }
    }

    /// Remove nodes with no outgoing edges that no other node links to
    pub fn prune_orphans(&mut self) {
        let mut linked: BTreeSet<String> = BTreeSet::new();
        for (id, node) in &self.nodes {
            for target in &node.edges {
                if target != id {
                    linked.insert(target.clone());
                }
            }
        }
        self.nodes
            .retain(|id, node| !node.edges.is_empty() || linked.contains(id));
    }
}

// === Options ===

/// Per-view display options the host graph exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub show_tags: bool,
    pub show_attachments: bool,
    pub show_orphans: bool,
    pub hide_unresolved: bool,
    /// Restrict the graph to these document paths (local graph); empty = all
    pub file_filter: BTreeSet<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_tags: false,
            show_attachments: false,
            show_orphans: true,
            hide_unresolved: false,
            file_filter: BTreeSet::new(),
        }
    }
}

/// Host search-query predicates for the color pass
pub trait NodeColorFilter {
    /// Whether the node passes the host's active queries
    fn matches(&self, id: &str, kind: NodeKind) -> bool;
}

// === Builder ===

/// Builds the override graph from the vault and its metadata
pub struct GraphModelBuilder<'a, V: VaultTree + ?Sized, M: MetadataIndex + ?Sized> {
    vault: &'a V,
    metadata: &'a M,
    settings: &'a SettingsSnapshot,
    matcher: PathMatcher,
    color_filter: Option<&'a dyn NodeColorFilter>,
}

impl<'a, V: VaultTree + ?Sized, M: MetadataIndex + ?Sized> GraphModelBuilder<'a, V, M> {
    pub fn new(vault: &'a V, metadata: &'a M, settings: &'a SettingsSnapshot) -> Self {
        Self {
            vault,
            metadata,
            settings,
            matcher: PathMatcher::new(settings),
            color_filter: None,
        }
    }

    /// Enable the color pass
    pub fn color_filter(mut self, filter: &'a dyn NodeColorFilter) -> Self {
        self.color_filter = Some(filter);
        self
    }

    /// Build the graph for a view
    pub fn build(&self, active: Option<&str>, options: &RenderOptions) -> Graph {
        let mut graph = Graph::default();
        let resolver = IndexFileResolver::new(self.settings, &self.matcher);

        for doc in self.vault.all_documents() {
            if !options.file_filter.is_empty() && !options.file_filter.contains(&doc.path) {
                continue;
            }
            if self.matcher.is_excluded(&doc.path) {
                continue;
            }

            let kind = if active == Some(doc.path.as_str()) {
                NodeKind::Focused
            } else if !doc.is_markdown() {
                NodeKind::Attachment
            } else {
                NodeKind::Plain
            };
            if kind == NodeKind::Attachment && !options.show_attachments {
                continue;
            }

            let mut edges = BTreeSet::new();
            if resolver.is_index_file(&doc.path) {
                self.add_hierarchy_edges(&doc, &resolver, &mut edges);
            }
            self.add_link_edges(&doc, options, &mut graph, &mut edges);
            if options.show_tags {
                for tag in self.metadata.tags(&doc.path) {
                    graph.add_synthetic(&tag.label, NodeKind::Tag);
                    edges.insert(tag.label);
                }
            }

            // A synthetic node with the same id is replaced by the document
            graph.nodes.insert(
                doc.path.clone(),
                GraphNode {
                    edges,
                    kind,
                    color: None,
                },
            );
        }

        graph.drop_dangling_edges();
        if !options.show_orphans {
            graph.prune_orphans();
        }
        if let Some(filter) = self.color_filter {
            apply_colors(&mut graph, filter);
        }
        graph
    }

    /// Index note -> sibling documents and sibling folders' index notes
    fn add_hierarchy_edges(&self, doc: &DocumentNode, resolver: &IndexFileResolver<'_>, edges: &mut BTreeSet<String>) {
        for sibling in self.vault.children(&doc.parent_folder_path) {
            if self.matcher.is_entry_excluded(&sibling) {
                continue;
            }
            match sibling {
                Entry::Document(other) if other.path != doc.path => {
                    edges.insert(other.path);
                }
                Entry::Folder(folder) => {
                    if let Some(index) = resolver.index_among(&self.vault.children(&folder.path)) {
                        edges.insert(index.path);
                    }
                }
                Entry::Document(_) => {}
            }
        }
    }

    fn add_link_edges(&self, doc: &DocumentNode, options: &RenderOptions, graph: &mut Graph, edges: &mut BTreeSet<String>) {
        for link in self.metadata.links(&doc.path) {
            let label = strip_fragment(strip_alias(&link.target));
            // `[[#Heading]]` points back into the same document
            if label.is_empty() {
                continue;
            }
            match self.resolve(label, &doc.path) {
                Some(path) => {
                    edges.insert(path);
                }
                None => {
                    log::debug!("unresolved link {:?} in {}", label, doc.path);
                    if !options.hide_unresolved {
                        graph.add_synthetic(label, NodeKind::Unresolved);
                        edges.insert(label.to_string());
                    }
                }
            }
        }

        // Embeds always show their unresolved target
        for embed in self.metadata.embeds(&doc.path) {
            let label = strip_fragment(strip_alias(&embed.target));
            if label.is_empty() {
                continue;
            }
            match self.resolve(label, &doc.path) {
                Some(path) => {
                    edges.insert(path);
                }
                None => {
                    graph.add_synthetic(label, NodeKind::Unresolved);
                    edges.insert(label.to_string());
                }
            }
        }
    }

    fn resolve(&self, label: &str, from: &str) -> Option<String> {
        self.metadata
            .resolve_link_target(label, from)
            .filter(|path| !self.matcher.is_excluded(path))
    }
}

fn strip_alias(label: &str) -> &str {
    label.split('|').next().unwrap_or(label).trim()
}

fn strip_fragment(label: &str) -> &str {
    label.split(C::HEADING_SEPARATOR).next().unwrap_or(label).trim()
}

/// Mark every node the host's queries reject
fn apply_colors(graph: &mut Graph, filter: &dyn NodeColorFilter) {
    for (id, node) in graph.nodes.iter_mut() {
        if !filter.matches(id, node.kind) {
            node.color = Some(NodeColor::Suppressed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{DocumentMetadata, VaultSnapshot};

    fn vault() -> VaultSnapshot {
        let mut vault = VaultSnapshot::new();
        vault
            .add_file("Dashboard.md")
            .add_file("Projects/Projects.md")
            .add_document(
                "Projects/Alpha.md",
                DocumentMetadata::new()
                    .link("Beta#Goals")
                    .link("Ghost")
                    .tag("rust")
                    .embed("diagram.png"),
            )
            .add_file("Projects/diagram.png")
            .add_file("Projects/Beta/Beta.md")
            .add_file("Archive/2020/note.md");
        vault
    }

    fn build(vault: &VaultSnapshot, settings: &SettingsSnapshot, active: Option<&str>, options: &RenderOptions) -> Graph {
        GraphModelBuilder::new(vault, vault, settings).build(active, options)
    }

    #[test]
    fn test_index_hierarchy_edges() {
        let vault = vault();
        let graph = build(&vault, &SettingsSnapshot::default(), None, &RenderOptions::default());
        assert!(graph.has_edge("Projects/Projects.md", "Projects/Alpha.md"));
        assert!(graph.has_edge("Projects/Projects.md", "Projects/Beta/Beta.md"));
        assert!(!graph.has_edge("Projects/Projects.md", "Projects/Projects.md"));
        // Root index links to the top-level folder indexes
        assert!(graph.has_edge("Dashboard.md", "Projects/Projects.md"));
        // Attachments are hidden by default
        assert!(!graph.contains("Projects/diagram.png"));
        assert!(!graph.has_edge("Projects/Projects.md", "Projects/diagram.png"));
    }

    #[test]
    fn test_links_strip_fragment_and_unresolved() {
        let vault = vault();
        let graph = build(&vault, &SettingsSnapshot::default(), None, &RenderOptions::default());
        assert!(graph.has_edge("Projects/Alpha.md", "Projects/Beta/Beta.md"));
        assert_eq!(graph.node("Ghost").map(|n| n.kind), Some(NodeKind::Unresolved));
        assert!(graph.has_edge("Projects/Alpha.md", "Ghost"));
    }

    #[test]
    fn test_hide_unresolved_keeps_unresolved_embeds() {
        let mut vault = vault();
        vault.metadata_mut("Projects/Alpha.md").unwrap().embeds.push(crate::vault::LinkRecord::new("missing.png"));
        let options = RenderOptions {
            hide_unresolved: true,
            ..RenderOptions::default()
        };
        let graph = build(&vault, &SettingsSnapshot::default(), None, &options);
        assert!(!graph.contains("Ghost"));
        assert_eq!(graph.node("missing.png").map(|n| n.kind), Some(NodeKind::Unresolved));
    }

    #[test]
    fn test_same_document_heading_links() {
        let mut vault = VaultSnapshot::new();
        vault.add_document(
            "Notes/a.md",
            crate::markdown::parse_document("# Top\n## Sec\nSee [[#Sec]] and ![[#Top]]\n"),
        );
        let graph = build(&vault, &SettingsSnapshot::default(), None, &RenderOptions::default());
        assert_eq!(graph.len(), 1);
        assert!(!graph.contains(""));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_tags_and_attachments() {
        let vault = vault();
        let options = RenderOptions {
            show_tags: true,
            show_attachments: true,
            ..RenderOptions::default()
        };
        let graph = build(&vault, &SettingsSnapshot::default(), None, &options);
        assert_eq!(graph.node("#rust").map(|n| n.kind), Some(NodeKind::Tag));
        assert!(graph.has_edge("Projects/Alpha.md", "#rust"));
        assert_eq!(
            graph.node("Projects/diagram.png").map(|n| n.kind),
            Some(NodeKind::Attachment)
        );
        assert!(graph.has_edge("Projects/Alpha.md", "Projects/diagram.png"));
    }

    #[test]
    fn test_focused_node() {
        let vault = vault();
        let graph = build(
            &vault,
            &SettingsSnapshot::default(),
            Some("Projects/Alpha.md"),
            &RenderOptions::default(),
        );
        assert_eq!(graph.node("Projects/Alpha.md").map(|n| n.kind), Some(NodeKind::Focused));
        assert_eq!(graph.node("Dashboard.md").map(|n| n.kind), Some(NodeKind::Plain));
    }

    #[test]
    fn test_excluded_documents_are_not_nodes() {
        let vault = vault();
        let settings = SettingsSnapshot {
            exclude_patterns: vec!["Archive/*".to_string()],
            ..SettingsSnapshot::default()
        };
        let graph = build(&vault, &settings, None, &RenderOptions::default());
        assert!(!graph.contains("Archive/2020/note.md"));
        assert!(build(&vault, &SettingsSnapshot::default(), None, &RenderOptions::default())
            .contains("Archive/2020/note.md"));
    }

    #[test]
    fn test_orphans_pruned() {
        let vault = vault();
        let options = RenderOptions {
            show_orphans: false,
            ..RenderOptions::default()
        };
        let graph = build(&vault, &SettingsSnapshot::default(), None, &options);
        assert!(!graph.contains("Archive/2020/note.md"));
        assert!(graph.contains("Projects/Alpha.md"));
    }

    #[test]
    fn test_unreferenced_tag_node_is_pruned() {
        let mut graph = Graph::default();
        graph.add_synthetic("#lonely", NodeKind::Tag);
        graph.add_synthetic("#used", NodeKind::Tag);
        let mut doc = GraphNode::new(NodeKind::Plain);
        doc.edges.insert("#used".to_string());
        graph.nodes.insert("a.md".to_string(), doc);

        graph.prune_orphans();
        assert!(!graph.contains("#lonely"));
        assert!(graph.contains("#used"));
        assert!(graph.contains("a.md"));
    }

    #[test]
    fn test_file_filter_limits_documents() {
        let vault = vault();
        let options = RenderOptions {
            file_filter: ["Projects/Alpha.md", "Projects/Beta/Beta.md"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..RenderOptions::default()
        };
        let graph = build(&vault, &SettingsSnapshot::default(), None, &options);
        assert!(graph.contains("Projects/Alpha.md"));
        assert!(!graph.contains("Dashboard.md"));
        assert!(graph.has_edge("Projects/Alpha.md", "Projects/Beta/Beta.md"));
    }

    struct OnlyProjects;

    impl NodeColorFilter for OnlyProjects {
        fn matches(&self, id: &str, _kind: NodeKind) -> bool {
            id.starts_with("Projects/")
        }
    }

    #[test]
    fn test_color_pass() {
        let vault = vault();
        let settings = SettingsSnapshot::default();
        let filter = OnlyProjects;
        let graph = GraphModelBuilder::new(&vault, &vault, &settings)
            .color_filter(&filter)
            .build(None, &RenderOptions::default());
        assert_eq!(graph.node("Projects/Alpha.md").and_then(|n| n.color), None);
        assert_eq!(
            graph.node("Dashboard.md").and_then(|n| n.color),
            Some(NodeColor::Suppressed)
        );
    }

    #[test]
    fn test_json_shape() {
        let mut graph = Graph::default();
        graph.add_synthetic("Ghost", NodeKind::Unresolved);
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"]["Ghost"]["type"], "unresolved");
        assert!(json["nodes"]["Ghost"]["links"].as_array().unwrap().is_empty());
    }
}
