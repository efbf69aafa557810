//! Heading hierarchy reconstruction
//!
//! Rebuilds a nested heading tree from the flat, document-ordered list the
//! metadata index reports. Nodes live in an arena and refer to their parent
//! by index.
//!
//! Attachment rules:
//! - every level-1 heading is a root
//! - a node's children are the headings after it, up to the next heading of
//!   the same or a higher level, whose level is exactly one deeper
//!
//! A heading that skips a level (an `###` directly under a `#`) is therefore
//! never attached and does not appear in the tree, and neither does anything
//! before the first level-1 heading.

use crate::settings::SortMode;
use crate::sort;
use crate::vault::HeadingRecord;

/// One heading in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    pub record: HeadingRecord,
    /// Arena index of the parent, `None` for roots
    pub parent: Option<usize>,
    /// Arena indices of the children, in display order
    pub children: Vec<usize>,
}

/// Arena-backed heading forest for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingTree {
    nodes: Vec<HeadingNode>,
    roots: Vec<usize>,
}

impl HeadingTree {
    /// Build the tree from headings in document order
    pub fn build(records: &[HeadingRecord]) -> Self {
        let mut tree = Self::default();
        for (i, record) in records.iter().enumerate() {
            if record.level == 1 {
                let id = tree.push(record.clone(), None);
                tree.roots.push(id);
                tree.attach_children(records, i + 1, id);
            }
        }
        tree
    }

    fn push(&mut self, record: HeadingRecord, parent: Option<usize>) -> usize {
        self.nodes.push(HeadingNode {
            record,
            parent,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn attach_children(&mut self, records: &[HeadingRecord], start: usize, parent: usize) {
        let parent_level = self.nodes[parent].record.level;
        for (i, record) in records.iter().enumerate().skip(start) {
            if record.level <= parent_level {
                return;
            }
            if record.level == parent_level + 1 {
                let id = self.push(record.clone(), Some(parent));
                self.nodes[parent].children.push(id);
                self.attach_children(records, i + 1, id);
            }
        }
    }

    /// Root indices in display order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn node(&self, id: usize) -> &HeadingNode {
        &self.nodes[id]
    }

    pub fn children(&self, id: usize) -> &[usize] {
        &self.nodes[id].children
    }

    /// Number of attached headings
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(p) = current {
            out.push(p);
            current = self.nodes[p].parent;
        }
        out
    }

    /// Heading texts from the outermost ancestor down to `id`
    pub fn chain(&self, id: usize) -> Vec<&str> {
        let mut chain: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .map(|a| self.nodes[a].record.text.as_str())
            .collect();
        chain.reverse();
        chain.push(&self.nodes[id].record.text);
        chain
    }

    /// Drop a leading level-1 heading (the document title) and promote its children
    ///
    /// Only applies when that heading is the first heading of the document.
    /// Promoted children become roots, so deep links no longer include the
    /// dropped title.
    pub fn skip_first_heading(&mut self, records: &[HeadingRecord]) {
        let Some(first) = records.first() else {
            return;
        };
        let Some(&root) = self.roots.first() else {
            return;
        };
        if first.level != 1 || self.nodes[root].record != *first {
            return;
        }

        let promoted = std::mem::take(&mut self.nodes[root].children);
        for &child in &promoted {
            self.nodes[child].parent = None;
        }
        self.roots.splice(0..1, promoted);
    }

    /// Sort every sibling group by heading text
    pub fn sort_siblings(&mut self, mode: SortMode) {
        if mode == SortMode::None {
            return;
        }
        let mut roots = std::mem::take(&mut self.roots);
        self.sort_ids(&mut roots, mode);
        self.roots = roots;
        for id in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[id].children);
            self.sort_ids(&mut children, mode);
            self.nodes[id].children = children;
        }
    }

    fn sort_ids(&self, ids: &mut [usize], mode: SortMode) {
        ids.sort_by(|&a, &b| {
            sort::compare_names(mode, &self.nodes[a].record.text, &self.nodes[b].record.text)
        });
    }
}
