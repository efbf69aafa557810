//! Folder outline rendering
//!
//! Produces the nested markdown list shown by a `folder-index-content`
//! block. Every call recomputes from the live vault: nothing is cached
//! between renders.
//!
//! Line format (one tab per depth level):
//!
//! ```text
//! {indent}{marker} {embed}[[{path}#{heading}|{name}]]     wikilink style
//! {indent}{marker} {embed}[{name}]({encoded path}#{heading})  markdown style
//! {indent}{marker} {name}                                  folder without index
//! ```

use crate::constants as C;
use crate::directive::OutlineDirective;
use crate::folder_tree::{FolderTreeBuilder, TreeItem};
use crate::headings::HeadingTree;
use crate::path_matcher::PathMatcher;
use crate::settings::{LinkStyle, SettingsSnapshot};
use crate::vault::{split_path, DocumentNode, Entry, MetadataIndex, VaultTree};

// === OutlineEntry ===

/// Where an outline line links to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Vault path of the document
    pub path: String,
    /// Heading chain, outermost first (empty for the document itself)
    pub headings: Vec<String>,
}

/// One rendered line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub indent_depth: usize,
    pub display_text: String,
    /// `None` for a folder without an index note
    pub target: Option<LinkTarget>,
    pub is_folder_header: bool,
}

impl OutlineEntry {
    /// Format as a markdown list line
    pub fn format(&self, settings: &SettingsSnapshot) -> String {
        let indent = C::INDENT.repeat(self.indent_depth);
        let marker = if settings.use_bullet_points {
            C::BULLET_MARKER
        } else {
            C::NUMBERED_MARKER
        };

        let mut name = self.display_text.clone();
        if self.is_folder_header {
            if settings.render_folder_italic {
                name = format!("*{}*", name);
            }
            if settings.render_folder_bold {
                name = format!("**{}**", name);
            }
        }

        let Some(target) = &self.target else {
            return format!("{}{} {}", indent, marker, name);
        };

        let embed = if settings.include_file_content {
            C::EMBED_MARKER
        } else {
            ""
        };
        let link = match settings.link_style {
            LinkStyle::Wikilink => format!("[[{}|{}]]", wikilink_target(target), name),
            LinkStyle::Markdown => format!("[{}]({})", name, markdown_target(target)),
        };
        format!("{}{} {}{}", indent, marker, embed, link)
    }
}

/// `folder/note#Heading#Sub`, extension dropped for markdown documents
fn wikilink_target(target: &LinkTarget) -> String {
    let path = target
        .path
        .strip_suffix(&format!(".{}", C::MARKDOWN_EXTENSION))
        .unwrap_or(&target.path);
    let mut out = path.to_string();
    for heading in &target.headings {
        out.push(C::HEADING_SEPARATOR);
        out.push_str(heading);
    }
    out
}

/// `folder/my%20note.md#Heading#Sub%20part`
fn markdown_target(target: &LinkTarget) -> String {
    let mut out = encode_uri(&target.path);
    for heading in &target.headings {
        out.push(C::HEADING_SEPARATOR);
        out.push_str(&encode_uri(heading));
    }
    out
}

/// Percent-encode everything outside the URI reserved and unreserved sets
///
/// Same character classes as ECMAScript `encodeURI`.
pub fn encode_uri(s: &str) -> String {
    const KEEP: &[u8] = b";,/?:@&=+$-_.!~*'()#";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if b.is_ascii_alphanumeric() || KEEP.contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

// === OutlineRenderer ===

/// Renders folder outlines against a vault and its metadata
pub struct OutlineRenderer<'a, V: VaultTree + ?Sized, M: MetadataIndex + ?Sized> {
    vault: &'a V,
    metadata: &'a M,
    settings: &'a SettingsSnapshot,
    matcher: PathMatcher,
    recursion_limit: Option<usize>,
}

impl<'a, V: VaultTree + ?Sized, M: MetadataIndex + ?Sized> OutlineRenderer<'a, V, M> {
    pub fn new(vault: &'a V, metadata: &'a M, settings: &'a SettingsSnapshot) -> Self {
        Self {
            vault,
            metadata,
            settings,
            matcher: PathMatcher::new(settings),
            recursion_limit: settings.recursion_limit,
        }
    }

    /// Apply a code block's local configuration
    pub fn with_directive(mut self, directive: &OutlineDirective) -> Self {
        if !directive.ignore.is_empty() {
            self.matcher = PathMatcher::with_local(self.settings, &directive.ignore);
        }
        if let Some(limit) = directive.recursion_limit {
            self.recursion_limit = limit;
        }
        self
    }

    /// Outline for the folder containing `document_path`
    pub fn render_for_document(&self, document_path: &str) -> String {
        if self.vault.resolve(document_path).is_none() {
            log::debug!("outline host {} is not in the vault", document_path);
        }
        let (folder, _) = split_path(document_path);
        self.render_folder(folder)
    }

    /// Outline for the children of `folder_path`
    pub fn render_folder(&self, folder_path: &str) -> String {
        self.render(&self.vault.children(folder_path))
    }

    /// Outline for an explicit set of folder children
    pub fn render(&self, children: &[Entry]) -> String {
        self.entries(children)
            .iter()
            .map(|entry| entry.format(self.settings))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The lines [`render`](Self::render) formats
    pub fn entries(&self, children: &[Entry]) -> Vec<OutlineEntry> {
        let items = FolderTreeBuilder::new(self.vault, self.settings, &self.matcher)
            .recursion_limit(self.recursion_limit)
            .build(children);
        let mut out = Vec::new();
        self.push_items(&items, 0, &mut out);
        out
    }

    fn push_items(&self, items: &[TreeItem], depth: usize, out: &mut Vec<OutlineEntry>) {
        for item in items {
            match item {
                TreeItem::Document(doc) => self.push_document(doc, depth, false, out),
                TreeItem::Folder {
                    folder,
                    index,
                    children,
                    ..
                } => {
                    match index {
                        Some(doc) => self.push_document(doc, depth, true, out),
                        None => out.push(OutlineEntry {
                            indent_depth: depth,
                            display_text: folder.name.clone(),
                            target: None,
                            is_folder_header: true,
                        }),
                    }
                    self.push_items(children, depth + 1, out);
                }
            }
        }
    }

    fn push_document(&self, doc: &DocumentNode, depth: usize, is_folder_header: bool, out: &mut Vec<OutlineEntry>) {
        out.push(OutlineEntry {
            indent_depth: depth,
            display_text: self.display_name(doc),
            target: Some(LinkTarget {
                path: doc.path.clone(),
                headings: Vec::new(),
            }),
            is_folder_header,
        });
        self.push_headings(doc, depth + 1, out);
    }

    fn display_name(&self, doc: &DocumentNode) -> String {
        self.metadata
            .frontmatter_title(&doc.path)
            .unwrap_or_else(|| doc.basename.clone())
    }

    fn push_headings(&self, doc: &DocumentNode, depth: usize, out: &mut Vec<OutlineEntry>) {
        if self.settings.disable_headings || self.settings.heading_limit == 0 {
            return;
        }
        let records = self.metadata.headings(&doc.path);
        if records.is_empty() {
            return;
        }

        let mut tree = HeadingTree::build(&records);
        if self.settings.skip_first_heading {
            tree.skip_first_heading(&records);
        }
        tree.sort_siblings(self.settings.sort_headings);

        for &root in tree.roots() {
            self.push_heading(doc, &tree, root, depth, 1, out);
        }
    }

    fn push_heading(
        &self,
        doc: &DocumentNode,
        tree: &HeadingTree,
        id: usize,
        depth: usize,
        level: usize,
        out: &mut Vec<OutlineEntry>,
    ) {
        out.push(OutlineEntry {
            indent_depth: depth,
            display_text: tree.node(id).record.text.clone(),
            target: Some(LinkTarget {
                path: doc.path.clone(),
                headings: tree.chain(id).into_iter().map(str::to_string).collect(),
            }),
            is_folder_header: false,
        });
        if level < self.settings.heading_limit {
            for &child in tree.children(id) {
                self.push_heading(doc, tree, child, depth + 1, level + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SortMode;
    use crate::vault::{DocumentMetadata, VaultSnapshot};

    fn render(vault: &VaultSnapshot, settings: &SettingsSnapshot, folder: &str) -> String {
        OutlineRenderer::new(vault, vault, settings).render_folder(folder)
    }

    #[test]
    fn test_default_outline() {
        let mut vault = VaultSnapshot::new();
        vault
            .add_document("A.md", DocumentMetadata::new().heading(1, "X").heading(2, "Y"))
            .add_file("B.md");
        let out = render(&vault, &SettingsSnapshot::default(), "");
        assert_eq!(out, "1. [[A|A]]\n\t1. [[A#Y|Y]]\n1. [[B|B]]");
    }

    #[test]
    fn test_markdown_link_style() {
        let mut vault = VaultSnapshot::new();
        vault.add_document(
            "My Notes/Big Plan.md",
            DocumentMetadata::new().heading(1, "Plan").heading(2, "Step One").heading(3, "Detail"),
        );
        let settings = SettingsSnapshot {
            link_style: LinkStyle::Markdown,
            skip_first_heading: false,
            use_bullet_points: true,
            ..SettingsSnapshot::default()
        };
        let out = render(&vault, &settings, "My Notes");
        assert_eq!(
            out,
            "- [Big Plan](My%20Notes/Big%20Plan.md)\n\
             \t- [Plan](My%20Notes/Big%20Plan.md#Plan)\n\
             \t\t- [Step One](My%20Notes/Big%20Plan.md#Plan#Step%20One)\n\
             \t\t\t- [Detail](My%20Notes/Big%20Plan.md#Plan#Step%20One#Detail)"
        );
    }

    #[test]
    fn test_frontmatter_title_and_embed() {
        let mut vault = VaultSnapshot::new();
        vault.add_document("notes/x.md", DocumentMetadata::new().title("Fancy Title"));
        let settings = SettingsSnapshot {
            include_file_content: true,
            ..SettingsSnapshot::default()
        };
        assert_eq!(render(&vault, &settings, "notes"), "1. ![[notes/x|Fancy Title]]");
    }

    #[test]
    fn test_recursive_folders_bold_italic() {
        let mut vault = VaultSnapshot::new();
        vault
            .add_file("Top/Top.md")
            .add_file("Top/Sub/Sub.md")
            .add_file("Top/Sub/page.md")
            .add_file("Top/Plain/leaf.md");
        let settings = SettingsSnapshot {
            recursive: true,
            render_folder_italic: true,
            ..SettingsSnapshot::default()
        };
        let out = render(&vault, &settings, "Top");
        assert_eq!(
            out,
            "1. ***Plain***\n\
             \t1. [[Top/Plain/leaf|leaf]]\n\
             1. [[Top/Sub/Sub|***Sub***]]\n\
             \t1. [[Top/Sub/page|page]]"
        );
    }

    #[test]
    fn test_recursion_limit_one() {
        let mut vault = VaultSnapshot::new();
        vault
            .add_file("L1/L1.md")
            .add_file("L1/L2/L2.md")
            .add_file("L1/L2/grandchild.md");
        let settings = SettingsSnapshot {
            recursive: true,
            recursion_limit: Some(1),
            render_folder_bold: false,
            ..SettingsSnapshot::default()
        };
        let out = render(&vault, &settings, "");
        assert_eq!(out, "1. [[L1/L1|L1]]\n\t1. [[L1/L2/L2|L2]]");
    }

    #[test]
    fn test_exclusion_pattern() {
        let mut vault = VaultSnapshot::new();
        vault
            .add_file("Archive/2020/note.md")
            .add_file("keep.md");
        let settings = SettingsSnapshot {
            recursive: true,
            exclude_patterns: vec!["Archive/*".to_string()],
            ..SettingsSnapshot::default()
        };
        assert_eq!(render(&vault, &settings, ""), "1. [[keep|keep]]");
    }

    #[test]
    fn test_directive_overrides() {
        let mut vault = VaultSnapshot::new();
        vault
            .add_file("a.md")
            .add_file("draft-b.md")
            .add_file("Deep/Deep.md")
            .add_file("Deep/inner.md");
        let settings = SettingsSnapshot {
            recursive: true,
            ..SettingsSnapshot::default()
        };
        let directive = OutlineDirective::parse("ignore: draft*\nrecursionLimit: 0");
        let out = OutlineRenderer::new(&vault, &vault, &settings)
            .with_directive(&directive)
            .render_folder("");
        assert_eq!(out, "1. [[a|a]]\n1. [[Deep/Deep|**Deep**]]");
    }

    #[test]
    fn test_heading_limit_and_sort() {
        let mut vault = VaultSnapshot::new();
        vault.add_document(
            "doc.md",
            DocumentMetadata::new()
                .heading(1, "b")
                .heading(2, "deep")
                .heading(1, "a"),
        );
        let settings = SettingsSnapshot {
            skip_first_heading: false,
            heading_limit: 1,
            sort_headings: SortMode::Alphabetical,
            ..SettingsSnapshot::default()
        };
        assert_eq!(
            render(&vault, &settings, ""),
            "1. [[doc|doc]]\n\t1. [[doc#a|a]]\n\t1. [[doc#b|b]]"
        );
    }

    #[test]
    fn test_disabled_headings() {
        let mut vault = VaultSnapshot::new();
        vault.add_document("doc.md", DocumentMetadata::new().heading(1, "X").heading(2, "Y"));
        let settings = SettingsSnapshot {
            disable_headings: true,
            ..SettingsSnapshot::default()
        };
        assert_eq!(render(&vault, &settings, ""), "1. [[doc|doc]]");
    }

    #[test]
    fn test_render_for_document_skips_own_index() {
        let mut vault = VaultSnapshot::new();
        vault
            .add_file("Projects/Projects.md")
            .add_file("Projects/alpha.md");
        let settings = SettingsSnapshot::default();
        let out = OutlineRenderer::new(&vault, &vault, &settings).render_for_document("Projects/Projects.md");
        assert_eq!(out, "1. [[Projects/alpha|alpha]]");
    }

    #[test]
    fn test_empty_folder_renders_nothing() {
        let vault = VaultSnapshot::new();
        assert_eq!(render(&vault, &SettingsSnapshot::default(), ""), "");
    }

    #[test]
    fn test_encode_uri() {
        assert_eq!(encode_uri("a b/c#d.md"), "a%20b/c#d.md");
        assert_eq!(encode_uri("é"), "%C3%A9");
        assert_eq!(encode_uri("(x)!"), "(x)!");
    }
}
