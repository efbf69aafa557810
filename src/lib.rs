pub mod cli;
pub mod constants;
pub mod context;
pub mod directive;
pub mod engine;
pub mod error;
pub mod folder_tree;
pub mod graph;
pub mod headings;
pub mod index_file;
pub mod index_note;
pub mod markdown;
pub mod outline;
pub mod path_matcher;
pub mod settings;
pub mod sort;
pub mod util;
pub mod vault;

pub use cli::{Cli, Command};
pub use context::VaultContext;
pub use directive::OutlineDirective;
pub use engine::{FolderIndexEngine, OutlineId};
pub use error::{Error, Result};
pub use graph::{Graph, GraphModelBuilder, GraphPatchController, RenderOptions};
pub use index_note::IndexNoteAction;
pub use outline::OutlineRenderer;
pub use settings::{LinkStyle, SettingsChannel, SettingsSnapshot, SortMode};
pub use vault::{scan::scan_vault, MetadataIndex, VaultSnapshot, VaultTree};

use constants as C;

/// Get the default settings file path in the user's config directory
pub fn default_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|p| p.join(C::CONFIG_DIR_NAME).join(C::SETTINGS_FILENAME))
}
