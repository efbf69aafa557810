//! Error types for folder-index
//!
//! Most failures in this crate are local and degrade a single branch of a
//! render. Only the variants below ever reach a caller:
//!
//! - [`Error::Unresolved`] - a referenced path or link has no target
//! - [`Error::Conflict`] - an index note create/rename would overwrite a file
//! - [`Error::InvalidPattern`] - an exclusion entry is not a valid regex
//! - [`Error::Settings`] / [`Error::Io`] - settings file and disk access

use std::io;

use thiserror::Error;

/// Errors surfaced by folder-index operations
#[derive(Debug, Error)]
pub enum Error {
    /// A path or link label could not be resolved in the vault
    #[error("cannot resolve '{path}'")]
    Unresolved { path: String },

    /// Moving or creating a file would collide with an existing one
    #[error("'{to}' already exists, refusing to replace it with '{from}'")]
    Conflict { from: String, to: String },

    /// An exclusion entry did not compile as a regular expression
    #[error("invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The settings file could not be parsed
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_yaml::Error),

    /// Disk access failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for an unresolved path
    pub fn unresolved(path: impl Into<String>) -> Self {
        Error::Unresolved { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message() {
        let err = Error::Conflict {
            from: "A/Old.md".to_string(),
            to: "A/A.md".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'A/A.md' already exists, refusing to replace it with 'A/Old.md'"
        );
    }

    #[test]
    fn test_unresolved_message() {
        let err = Error::unresolved("missing.md");
        assert_eq!(err.to_string(), "cannot resolve 'missing.md'");
    }
}
