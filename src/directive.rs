//! Inline configuration of a `folder-index-content` code block
//!
//! Each line is `key: value`. Recognised keys:
//! - `ignore`: comma-separated wildcard patterns, local to this block
//! - `recursionLimit`: integer depth limit, negative for unlimited
//! - `title`, `type`: display hints passed through to the host
//!
//! Unknown keys are ignored; malformed lines are skipped one by one.

use crate::path_matcher::parse_local_patterns;

/// Parsed code block configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineDirective {
    pub ignore: Vec<String>,
    /// `Some(None)` overrides the setting with "unlimited"
    pub recursion_limit: Option<Option<usize>>,
    pub title: Option<String>,
    pub kind: Option<String>,
}

impl OutlineDirective {
    /// Parse a code block body; never fails
    pub fn parse(block: &str) -> Self {
        let mut directive = Self::default();

        for (n, raw) in block.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                log::debug!("directive line {}: expected 'key: value', got {:?}", n + 1, line);
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "ignore" => directive.ignore.extend(parse_local_patterns(value)),
                "recursionLimit" => match value.parse::<i64>() {
                    Ok(limit) => directive.recursion_limit = Some(usize::try_from(limit).ok()),
                    Err(_) => {
                        log::debug!("directive line {}: invalid recursionLimit {:?}", n + 1, value)
                    }
                },
                "title" => directive.title = Some(value.to_string()),
                "type" => directive.kind = Some(value.to_string()),
                other => log::debug!("directive line {}: ignoring unknown key {:?}", n + 1, other),
            }
        }

        directive
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
