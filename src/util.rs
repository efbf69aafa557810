//! Path helpers for the command-line host

use std::io;
use std::path::{Path, PathBuf};

/// Resolve a vault-relative path under `base`, refusing anything that escapes it
pub fn secure_path(base: &Path, relative: &str) -> io::Result<PathBuf> {
    let mut result = base.to_path_buf();

    for component in relative.split(|c| c == '/' || c == '\\') {
        match component {
            "" | "." => continue,
            ".." => {
                if result == base {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "path traversal detected: cannot escape the vault",
                    ));
                }
                result.pop();
            }
            _ => {
                // Drive prefixes such as "C:"
                if component.len() >= 2 && component.as_bytes()[1] == b':' {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "absolute paths are not allowed",
                    ));
                }
                result.push(component);
            }
        }
    }

    if relative.starts_with('/') || relative.starts_with('\\') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "absolute paths are not allowed",
        ));
    }

    // Symlinks inside the vault may still point outside it
    if result.exists() && base.exists() {
        let canonical_base = dunce::canonicalize(base)?;
        let canonical_result = dunce::canonicalize(&result)?;
        if !canonical_result.starts_with(&canonical_base) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path traversal detected: resolved path escapes the vault",
            ));
        }
    }

    Ok(result)
}

/// Display a path with forward slashes
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
