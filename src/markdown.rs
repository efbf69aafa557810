//! Markdown metadata extraction using pulldown-cmark
//!
//! Turns a document's source into the [`DocumentMetadata`] the renderers
//! read through [`MetadataIndex`](crate::vault::MetadataIndex):
//! - headings with their byte offsets
//! - markdown links and `[[wikilinks]]`
//! - image links and `![[embeds]]`
//! - inline `#tags` and frontmatter `tags`
//! - frontmatter `title`

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;

use crate::constants as C;
use crate::vault::{DocumentMetadata, HeadingRecord, LinkRecord, TagRecord};

static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(!?)\[\[([^\[\]]+?)\]\]").expect("static regex"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/\-]*[\p{L}_/\-][\p{L}\p{N}_/\-]*)").expect("static regex")
});

/// Parse a whole document
pub fn parse_document(content: &str) -> DocumentMetadata {
    let (frontmatter, body, body_offset) = split_frontmatter(content);

    let mut metadata = DocumentMetadata {
        headings: extract_headings(body, body_offset),
        ..DocumentMetadata::default()
    };

    if let Some(fm) = frontmatter {
        let yaml: Option<serde_yaml::Value> = serde_yaml::from_str(fm).ok();
        if let Some(yaml) = yaml {
            metadata.title = frontmatter_string(&yaml, "title");
            metadata
                .tags
                .extend(frontmatter_tags(&yaml).iter().map(|t| TagRecord::new(t)));
        }
    }

    let refs = extract_references(body);
    metadata.links = refs.links;
    metadata.embeds = refs.embeds;
    metadata.tags.extend(refs.tags);
    metadata
}

/// Split leading `---` frontmatter from the body
///
/// Returns (frontmatter, body, byte offset of body in `content`).
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str, usize) {
    let Some(rest) = content.strip_prefix("---") else {
        return (None, content, 0);
    };
    if !rest.starts_with('\n') && !rest.starts_with("\r\n") {
        return (None, content, 0);
    }
    let Some(end_pos) = rest.find("\n---") else {
        return (None, content, 0);
    };

    let frontmatter = &rest[..end_pos];
    if frontmatter.len() > C::MAX_FRONTMATTER_SIZE {
        return (None, content, 0);
    }

    // Skip the closing delimiter line
    let after = &rest[end_pos + 4..];
    let skip = after.find('\n').map(|n| n + 1).unwrap_or(after.len());
    let body_offset = 3 + end_pos + 4 + skip;
    (Some(frontmatter), &content[body_offset..], body_offset)
}

fn frontmatter_string(yaml: &serde_yaml::Value, key: &str) -> Option<String> {
    match yaml.get(key)? {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `tags: a, b`, `tags: a b` or `tags: [a, b]`
fn frontmatter_tags(yaml: &serde_yaml::Value) -> Vec<String> {
    match yaml.get("tags") {
        Some(serde_yaml::Value::String(s)) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(serde_yaml::Value::Sequence(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Extract all headings with their byte offsets
pub fn extract_headings(content: &str, base_offset: usize) -> Vec<HeadingRecord> {
    let mut headings = Vec::new();
    let mut current: Option<(u8, usize)> = None;
    let mut current_text = String::new();

    for (event, range) in Parser::new(content).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((heading_level(level), range.start + base_offset));
                current_text.clear();
            }
            Event::Text(text) | Event::Code(text) => {
                if current.is_some() {
                    current_text.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, offset)) = current.take() {
                    headings.push(HeadingRecord::new(level, current_text.trim(), offset));
                }
            }
            _ => {}
        }
    }

    headings
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Links, embeds and inline tags found in a document body
#[derive(Debug, Default)]
pub struct References {
    pub links: Vec<LinkRecord>,
    pub embeds: Vec<LinkRecord>,
    pub tags: Vec<TagRecord>,
}

/// Extract links, embeds and tags outside of code
pub fn extract_references(content: &str) -> References {
    let mut refs = References::default();
    let mut in_code_block = false;
    // Adjacent text events are joined so `[[...]]` split by the parser is seen whole
    let mut text = String::new();

    for event in Parser::new(content) {
        match event {
            Event::Text(t) => {
                if !in_code_block {
                    text.push_str(&t);
                }
                continue;
            }
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Start(Tag::Link { dest_url, .. }) => {
                if let Some(target) = local_target(&dest_url) {
                    refs.links.push(LinkRecord::new(target));
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                if let Some(target) = local_target(&dest_url) {
                    refs.embeds.push(LinkRecord::new(target));
                }
            }
            _ => {}
        }
        scan_text(&text, &mut refs);
        text.clear();
    }
    scan_text(&text, &mut refs);

    refs
}

fn scan_text(text: &str, refs: &mut References) {
    if text.is_empty() {
        return;
    }
    for cap in WIKILINK_RE.captures_iter(text) {
        let target = cap[2].trim().to_string();
        if cap[1].is_empty() {
            refs.links.push(LinkRecord::new(target));
        } else {
            refs.embeds.push(LinkRecord::new(target));
        }
    }
    for cap in TAG_RE.captures_iter(text) {
        refs.tags.push(TagRecord::new(&cap[1]));
    }
}

/// Keep vault-local link destinations, decoded
fn local_target(dest: &str) -> Option<String> {
    if dest.is_empty() || dest.starts_with('#') || dest.contains("://") || dest.starts_with("mailto:") {
        return None;
    }
    Some(percent_decode(dest))
}

/// Decode `%XX` escapes; malformed escapes are kept as written
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Bodies of every fenced code block whose info string is `info`
pub fn find_code_blocks(content: &str, info: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                if lang.split_whitespace().next() == Some(info) {
                    current = Some(String::new());
                }
            }
            Event::Text(text) => {
                if let Some(body) = current.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(body) = current.take() {
                    blocks.push(body);
                }
            }
            _ => {}
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_headings() {
        let content = r#"
# Main Title
## Section 1
### Subsection
"#;
        let headings = extract_headings(content, 0);
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].text, "Main Title");
        assert_eq!(headings[1].level, 2);
        assert_eq!(headings[2].level, 3);
        assert!(headings[0].offset < headings[1].offset);
    }

    #[test]
    fn test_split_frontmatter() {
        let content = "---\ntitle: Hello\n---\n# Body\n";
        let (fm, body, offset) = split_frontmatter(content);
        assert_eq!(fm, Some("\ntitle: Hello"));
        assert_eq!(body, "# Body\n");
        assert_eq!(&content[offset..], body);
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, body, offset) = split_frontmatter("# Title\n---\n");
        assert_eq!(fm, None);
        assert_eq!(body, "# Title\n---\n");
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_frontmatter_does_not_become_heading() {
        let content = "---\ntags: MOCs\n---\n```folder-index-content\n```\n";
        let meta = parse_document(content);
        assert!(meta.headings.is_empty());
        assert_eq!(meta.tags, vec![TagRecord::new("MOCs")]);
    }

    #[test]
    fn test_parse_document_title_and_heading_offsets() {
        let content = "---\ntitle: Project Alpha\n---\n# Alpha\n\ntext\n";
        let meta = parse_document(content);
        assert_eq!(meta.title.as_deref(), Some("Project Alpha"));
        assert_eq!(meta.headings.len(), 1);
        assert_eq!(&content[meta.headings[0].offset..meta.headings[0].offset + 7], "# Alpha");
    }

    #[test]
    fn test_extract_links_and_embeds() {
        let content = "See [my note](notes/my%20note.md), [[Other#Part|alias]] and ![[image.png]].\n\n![pic](pics/a.png) [web](https://example.com)";
        let refs = extract_references(content);
        let links: Vec<&str> = refs.links.iter().map(|l| l.target.as_str()).collect();
        let embeds: Vec<&str> = refs.embeds.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(links, vec!["notes/my note.md", "Other#Part|alias"]);
        assert!(embeds.contains(&"image.png"));
        assert!(embeds.contains(&"pics/a.png"));
    }

    #[test]
    fn test_extract_tags() {
        let refs = extract_references("Tagged #rust and #project/alpha but not #123 or a#b");
        let tags: Vec<&str> = refs.tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(tags, vec!["#rust", "#project/alpha"]);
    }

    #[test]
    fn test_code_is_ignored() {
        let content = "```\n[[Hidden]] #hidden\n```\n\nVisible [[Shown]]";
        let refs = extract_references(content);
        assert_eq!(refs.links, vec![LinkRecord::new("Shown")]);
        assert!(refs.tags.is_empty());
    }

    #[test]
    fn test_find_code_blocks() {
        let content = "# Index\n\n```folder-index-content\nignore: Archive/*\n```\n\n```rust\nfn main() {}\n```\n";
        let blocks = find_code_blocks(content, C::CODE_FENCE_NAME);
        assert_eq!(blocks, vec!["ignore: Archive/*\n".to_string()]);
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
