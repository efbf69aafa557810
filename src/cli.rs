use clap::{Parser, Subcommand};

/// folder-index - Folder outlines and a folder-aware link graph for markdown vaults
///
/// # Quick Reference
///
/// ## Outlines
///
/// ```bash
/// folder-index outline Projects/Projects.md         # Outline of the Projects folder
/// folder-index outline Projects/Projects.md -r 1    # Only the first level
/// folder-index outline Dashboard.md --ignore "*draft*,Archive"
/// folder-index render Projects/Projects.md          # Render every embedded block
/// ```
///
/// An outline block embedded in a note looks like:
///
/// ~~~text
/// ```folder-index-content
/// ignore: *draft*, Archive
/// recursionLimit: 2
/// title: Contents
/// ```
/// ~~~
///
/// ## Index Notes
///
/// ```bash
/// folder-index is-index Projects/Projects.md    # true
/// folder-index init-index Projects/Alpha        # Create Projects/Alpha/Alpha.md
/// folder-index rename-folder Projects/Alpha Projects/Beta
///                                               # Also renames Alpha.md to Beta.md
/// ```
///
/// ## Graph
///
/// ```bash
/// folder-index graph                            # Nodes and edges as text
/// folder-index graph --tags --orphans           # Include tag nodes and orphans
/// folder-index --json graph --active Notes/x.md # JSON, with x.md marked focused
/// ```
///
/// ## Global Options
///
/// ```bash
/// folder-index --vault ~/notes outline Dashboard.md
/// folder-index --config ./settings.yaml settings
/// ```
///
/// ## Environment Variables
///
/// - `FOLDER_INDEX_VAULT`: Vault root (default: current directory)
/// - `FOLDER_INDEX_CONFIG`: Settings file (default: <config dir>/folder-index/settings.yaml)
/// - `RUST_LOG`: Log filter (default: warn)
#[derive(Parser, Debug)]
#[command(name = "folder-index")]
#[command(version = "0.1.0")]
#[command(about = "Folder outlines and a folder-aware link graph for markdown vaults")]
pub struct Cli {
    /// Vault root directory (default: $FOLDER_INDEX_VAULT or current directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub vault: Option<String>,

    /// Settings file (YAML)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Output in JSON format (for scripting)
    #[arg(short = 'j', long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the outline of the folder containing a document
    #[command(alias = "o")]
    Outline {
        /// Document hosting the outline (vault-relative)
        document: String,

        /// Extra exclusion patterns, comma separated
        #[arg(short, long, value_name = "PATTERNS")]
        ignore: Option<String>,

        /// Maximum folder depth (-1 for unlimited)
        #[arg(short = 'r', long, value_name = "N", allow_negative_numbers = true)]
        recursion_limit: Option<i64>,
    },

    /// Render every outline block embedded in a document
    Render {
        /// Document containing `folder-index-content` blocks
        document: String,
    },

    /// Print the folder-aware graph
    #[command(alias = "g")]
    Graph {
        /// Document to mark as focused
        #[arg(short, long, value_name = "PATH")]
        active: Option<String>,

        /// Include tag nodes
        #[arg(long)]
        tags: bool,

        /// Keep nodes without edges
        #[arg(long)]
        orphans: bool,

        /// Include attachment nodes
        #[arg(long)]
        attachments: bool,

        /// Drop links that point at missing documents
        #[arg(long)]
        hide_unresolved: bool,
    },

    /// Check whether a document is an index note
    IsIndex {
        /// Document path (vault-relative)
        path: String,
    },

    /// Create a folder's index note
    InitIndex {
        /// Folder path (vault-relative)
        folder: String,
    },

    /// Rename a folder and its index note
    #[command(alias = "mv")]
    RenameFolder {
        /// Current folder path
        old: String,

        /// New folder path
        new: String,
    },

    /// Print the effective settings as YAML
    Settings,
}
