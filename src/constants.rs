//! Constants for folder-index
//!
//! File names, format strings and limits shared by the outline renderer,
//! the graph builder and the command-line host.

// === File and Directory Names ===

/// Default name of the index note that represents the vault root
pub const DEFAULT_ROOT_INDEX_FILE: &str = "Dashboard.md";

/// Default name for index notes in custom-name mode
pub const DEFAULT_CUSTOM_INDEX_NAME: &str = "index.md";

/// Extension (without dot) of documents that can carry headings and links
pub const MARKDOWN_EXTENSION: &str = "md";

/// Path separator used by vault paths on every platform
pub const PATH_SEPARATOR: char = '/';

// === Directive ===

/// Info string of the code fence that embeds a folder outline
pub const CODE_FENCE_NAME: &str = "folder-index-content";

/// Placeholder replaced with the folder name in new index notes
pub const FOLDER_PLACEHOLDER: &str = "{{folder}}";

/// Default content for newly created index notes
pub const DEFAULT_INDEX_INIT_TEXT: &str = "---\ntags: MOCs\n---\n```folder-index-content\n```";

// === Outline Format Strings ===

/// Marker for bullet-style lists
pub const BULLET_MARKER: &str = "-";

/// Marker for numbered lists
pub const NUMBERED_MARKER: &str = "1.";

/// Prefix that turns a link into an embedded preview
pub const EMBED_MARKER: &str = "!";

/// One level of outline indentation
pub const INDENT: &str = "\t";

/// Separator between a document and heading segments in deep links
pub const HEADING_SEPARATOR: char = '#';

// === Limits ===

/// Default number of heading levels rendered below a document
pub const DEFAULT_HEADING_LIMIT: usize = 6;

/// Maximum size of frontmatter to parse (prevents DoS on malformed files)
pub const MAX_FRONTMATTER_SIZE: usize = 64 * 1024; // 64KB

// === Environment ===

/// Environment variable overriding the vault root for the CLI
pub const ENV_VAULT: &str = "FOLDER_INDEX_VAULT";

/// Environment variable overriding the settings file for the CLI
pub const ENV_CONFIG: &str = "FOLDER_INDEX_CONFIG";

/// Directory under the user config dir holding settings.yaml
pub const CONFIG_DIR_NAME: &str = "folder-index";

/// Settings file name
pub const SETTINGS_FILENAME: &str = "settings.yaml";
