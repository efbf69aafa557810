//! Vault and settings resolution for the command-line host
//!
//! The vault root is resolved in this order:
//! - explicit `--vault` argument
//! - `FOLDER_INDEX_VAULT` environment variable
//! - the current directory
//!
//! Settings come from `--config`, else `FOLDER_INDEX_CONFIG`, else
//! `<config_dir>/folder-index/settings.yaml` when it exists, else defaults.

use std::path::{Path, PathBuf};

use crate::constants as C;
use crate::error::Result;
use crate::settings::SettingsSnapshot;
use crate::util;
use crate::vault::normalize_path;

/// Everything a command needs to locate the vault
#[derive(Debug, Clone)]
pub struct VaultContext {
    /// Canonical vault root on disk
    pub root: PathBuf,
    /// Effective settings
    pub settings: SettingsSnapshot,
    /// Whether to output in JSON format
    pub json: bool,
}

impl VaultContext {
    /// Resolve the vault root and load settings
    pub fn new(vault: Option<&str>, config: Option<&str>, json: bool) -> Result<Self> {
        let root = resolve_vault_root(vault)?;
        let settings = match resolve_settings_path(config) {
            Some(path) => {
                log::debug!("loading settings from {}", util::display_path(&path));
                SettingsSnapshot::load(&path)?
            }
            None => SettingsSnapshot::default(),
        };
        Ok(Self { root, settings, json })
    }

    /// Turn a user-supplied path (relative to the vault or to the current
    /// directory) into a vault path
    pub fn vault_path(&self, arg: &str) -> String {
        let candidate = Path::new(arg);
        if candidate.is_absolute() {
            if let Ok(abs) = dunce::canonicalize(candidate) {
                if let Ok(rel) = abs.strip_prefix(&self.root) {
                    return normalize_path(&util::display_path(rel));
                }
            }
        }
        normalize_path(arg)
    }

    /// Location on disk of a vault path, refusing paths that escape the vault
    pub fn disk_path(&self, vault_path: &str) -> Result<PathBuf> {
        Ok(util::secure_path(&self.root, vault_path)?)
    }
}

/// Resolve the vault root directory
pub fn resolve_vault_root(explicit: Option<&str>) -> Result<PathBuf> {
    let raw = match explicit {
        Some(path) => PathBuf::from(path),
        None => match std::env::var(C::ENV_VAULT).ok().filter(|s| !s.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => std::env::current_dir()?,
        },
    };
    Ok(dunce::canonicalize(raw)?)
}

/// Resolve the settings file, if any applies
pub fn resolve_settings_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    if let Some(path) = std::env::var(C::ENV_CONFIG).ok().filter(|s| !s.is_empty()) {
        return Some(PathBuf::from(path));
    }
    crate::default_config_path().filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_context_loads_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.yaml");
        fs::write(&config, "recursive: true\nheadingLimit: 2\n").unwrap();

        let ctx = VaultContext::new(
            dir.path().to_str(),
            config.to_str(),
            false,
        )
        .unwrap();
        assert!(ctx.settings.recursive);
        assert_eq!(ctx.settings.heading_limit, 2);
        assert_eq!(ctx.root, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_vault_path_strips_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Books")).unwrap();
        fs::write(dir.path().join("Books/Dune.md"), "# Dune").unwrap();

        let ctx = VaultContext {
            root: dunce::canonicalize(dir.path()).unwrap(),
            settings: SettingsSnapshot::default(),
            json: false,
        };
        let abs = dir.path().join("Books/Dune.md");
        assert_eq!(ctx.vault_path(abs.to_str().unwrap()), "Books/Dune.md");
        assert_eq!(ctx.vault_path("Books\\Dune.md"), "Books/Dune.md");
        assert!(ctx.disk_path("../outside.md").is_err());
    }

    #[test]
    fn test_missing_vault_root_is_an_error() {
        assert!(resolve_vault_root(Some("/definitely/not/here/folder-index")).is_err());
    }
}
