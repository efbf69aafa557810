//! Settings snapshot and change channel
//!
//! A [`SettingsSnapshot`] captures every option for one render pass. It is
//! never mutated in place: a settings save produces a new snapshot that is
//! published through a [`SettingsChannel`] to every live subscriber.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants as C;
use crate::error::Result;

// === Options ===

/// Ordering applied to outline entries or heading siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Keep input order
    None,
    /// Locale-style compare on the name
    #[default]
    Alphabetical,
    /// Alphabetical, descending
    ReverseAlphabetical,
    /// Numeric-aware compare ("file2" before "file10")
    Natural,
    /// Natural, descending
    ReverseNatural,
}

/// How outline lines link to their targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkStyle {
    /// `[[path#heading|name]]`
    #[default]
    Wikilink,
    /// `[name](encoded/path.md#heading)`
    Markdown,
}

// === SettingsSnapshot ===

/// Immutable configuration for one render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsSnapshot {
    /// Sort order of files and folders at each outline level
    pub sort_files: SortMode,
    /// Sort order of headings within each sibling group
    pub sort_headings: SortMode,
    /// Descend into subfolders
    pub recursive: bool,
    /// Maximum folder depth rendered (None = unlimited)
    #[serde(deserialize_with = "deserialize_limit")]
    pub recursion_limit: Option<usize>,
    /// Heading levels rendered below each document (0 = none)
    pub heading_limit: usize,
    /// `-` instead of `1.`
    pub use_bullet_points: bool,
    pub render_folder_bold: bool,
    pub render_folder_italic: bool,
    /// Prefix links with `!` so the host embeds a preview
    pub include_file_content: bool,
    /// Drop a leading level-1 heading (usually the document title)
    pub skip_first_heading: bool,
    pub disable_headings: bool,
    /// Index note of the vault root
    pub root_index_file: String,
    /// Recognise `custom_index_name` as the index note of every folder
    pub use_custom_index_name: bool,
    pub custom_index_name: String,
    /// Full-string regular expressions matched against folder paths
    pub exclude_folders: Vec<String>,
    /// Case-insensitive wildcard patterns matched against any path
    pub exclude_patterns: Vec<String>,
    pub link_style: LinkStyle,
    /// Replace the host graph with the folder-aware graph
    pub graph_override: bool,
    pub auto_create_index_file: bool,
    pub auto_rename_index_file: bool,
    /// Content of newly created index notes (`{{folder}}` is substituted)
    pub index_file_init_text: String,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            sort_files: SortMode::Alphabetical,
            sort_headings: SortMode::None,
            recursive: false,
            recursion_limit: None,
            heading_limit: C::DEFAULT_HEADING_LIMIT,
            use_bullet_points: false,
            render_folder_bold: true,
            render_folder_italic: false,
            include_file_content: false,
            skip_first_heading: true,
            disable_headings: false,
            root_index_file: C::DEFAULT_ROOT_INDEX_FILE.to_string(),
            use_custom_index_name: false,
            custom_index_name: C::DEFAULT_CUSTOM_INDEX_NAME.to_string(),
            exclude_folders: Vec::new(),
            exclude_patterns: Vec::new(),
            link_style: LinkStyle::Wikilink,
            graph_override: false,
            auto_create_index_file: true,
            auto_rename_index_file: true,
            index_file_init_text: C::DEFAULT_INDEX_INIT_TEXT.to_string(),
        }
    }
}

impl SettingsSnapshot {
    /// Parse a (possibly partial) YAML settings document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Accept `null`, a non-negative count, or any negative number for "unlimited"
fn deserialize_limit<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|n| usize::try_from(n).ok()))
}

// === SettingsChannel ===

type Callback = Rc<RefCell<Box<dyn FnMut(&Rc<SettingsSnapshot>)>>>;

struct ChannelInner {
    current: Rc<SettingsSnapshot>,
    next_id: u64,
    subscribers: BTreeMap<u64, Callback>,
}

/// Single-threaded publish/subscribe channel for settings snapshots
///
/// Cloning the channel yields another handle to the same subscriber list.
#[derive(Clone)]
pub struct SettingsChannel {
    inner: Rc<RefCell<ChannelInner>>,
}

impl SettingsChannel {
    /// Create a channel holding an initial snapshot
    pub fn new(initial: SettingsSnapshot) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                current: Rc::new(initial),
                next_id: 0,
                subscribers: BTreeMap::new(),
            })),
        }
    }

    /// The most recently published snapshot
    pub fn current(&self) -> Rc<SettingsSnapshot> {
        Rc::clone(&self.inner.borrow().current)
    }

    /// Register a callback run on every publish
    ///
    /// The callback stays registered for as long as the returned
    /// [`Subscription`] is alive.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&Rc<SettingsSnapshot>) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .subscribers
            .insert(id, Rc::new(RefCell::new(Box::new(callback))));
        Subscription {
            channel: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Replace the current snapshot and notify every subscriber
    pub fn publish(&self, snapshot: SettingsSnapshot) {
        let snapshot = Rc::new(snapshot);
        // Release the borrow before running callbacks so they can read `current()`
        let callbacks: Vec<Callback> = {
            let mut inner = self.inner.borrow_mut();
            inner.current = Rc::clone(&snapshot);
            inner.subscribers.values().cloned().collect()
        };

        for callback in callbacks {
            match callback.try_borrow_mut() {
                Ok(mut f) => f(&snapshot),
                Err(_) => log::debug!("skipping re-entrant settings subscriber"),
            }
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl Default for SettingsChannel {
    fn default() -> Self {
        Self::new(SettingsSnapshot::default())
    }
}

/// Handle that keeps a settings callback registered
pub struct Subscription {
    channel: Weak<RefCell<ChannelInner>>,
    id: u64,
}

impl Subscription {
    /// Remove the callback now
    pub fn unsubscribe(self) {
        drop(self)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.channel.upgrade() {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.subscribers.remove(&self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_defaults_match_plugin_defaults() {
        let s = SettingsSnapshot::default();
        assert_eq!(s.sort_files, SortMode::Alphabetical);
        assert_eq!(s.root_index_file, "Dashboard.md");
        assert!(s.skip_first_heading);
        assert!(!s.use_bullet_points);
        assert_eq!(s.recursion_limit, None);
        assert_eq!(s.heading_limit, 6);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "useBulletPoints: true\nsortFiles: reverseNatural\nexcludePatterns:\n  - Archive/*\n";
        let s = SettingsSnapshot::from_yaml_str(yaml).unwrap();
        assert!(s.use_bullet_points);
        assert_eq!(s.sort_files, SortMode::ReverseNatural);
        assert_eq!(s.exclude_patterns, vec!["Archive/*".to_string()]);
        assert_eq!(s.root_index_file, "Dashboard.md");
    }

    #[test]
    fn test_negative_recursion_limit_is_unlimited() {
        let s = SettingsSnapshot::from_yaml_str("recursionLimit: -1").unwrap();
        assert_eq!(s.recursion_limit, None);
        let s = SettingsSnapshot::from_yaml_str("recursionLimit: 2").unwrap();
        assert_eq!(s.recursion_limit, Some(2));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let s = SettingsSnapshot::from_yaml_str("  \n").unwrap();
        assert_eq!(s, SettingsSnapshot::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut s = SettingsSnapshot::default();
        s.link_style = LinkStyle::Markdown;
        let parsed = SettingsSnapshot::from_yaml_str(&s.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn test_publish_notifies_subscribers() {
        let channel = SettingsChannel::default();
        let seen = Rc::new(Cell::new(false));
        let seen_in_cb = Rc::clone(&seen);
        let _sub = channel.subscribe(move |s| seen_in_cb.set(s.use_bullet_points));

        let mut next = SettingsSnapshot::default();
        next.use_bullet_points = true;
        channel.publish(next);

        assert!(seen.get());
        assert!(channel.current().use_bullet_points);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let channel = SettingsChannel::default();
        let calls = Rc::new(Cell::new(0));
        let calls_in_cb = Rc::clone(&calls);
        let sub = channel.subscribe(move |_| calls_in_cb.set(calls_in_cb.get() + 1));
        assert_eq!(channel.subscriber_count(), 1);

        channel.publish(SettingsSnapshot::default());
        sub.unsubscribe();
        channel.publish(SettingsSnapshot::default());

        assert_eq!(calls.get(), 1);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_can_read_current() {
        let channel = SettingsChannel::default();
        let reader = channel.clone();
        let seen = Rc::new(Cell::new(false));
        let seen_in_cb = Rc::clone(&seen);
        let _sub = channel.subscribe(move |_| seen_in_cb.set(reader.current().recursive));

        let mut next = SettingsSnapshot::default();
        next.recursive = true;
        channel.publish(next);
        assert!(seen.get());
    }
}
