//! Path validation
//!
//! Resolves client-supplied paths against a session's virtual working
//! directory. Virtual paths are always absolute and never climb above `/`,
//! which maps onto the account's home directory.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Maximum nesting accepted in a virtual path.
pub const MAX_DIRECTORY_DEPTH: usize = 32;

/// Resolves `target` relative to `current_virtual_path` into a normalized
/// absolute virtual path. `..` at the root stays at the root.
pub fn resolve_virtual_path(current_virtual_path: &str, target: &str) -> Result<String, StorageError> {
    if target.contains('\0') {
        return Err(StorageError::InvalidPath(target.to_string()));
    }

    let mut components: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        current_virtual_path
            .split('/')
            .filter(|part| !part.is_empty())
            .collect()
    };

    for part in target.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            name => components.push(name),
        }
    }

    if components.len() > MAX_DIRECTORY_DEPTH {
        return Err(StorageError::InvalidPath(target.to_string()));
    }

    Ok(format!("/{}", components.join("/")))
}

/// Maps a normalized virtual path onto the real filesystem under `home`.
pub fn virtual_to_real_path(home: &Path, virtual_path: &str) -> PathBuf {
    let relative = virtual_path.trim_start_matches('/');
    if relative.is_empty() {
        home.to_path_buf()
    } else {
        home.join(relative)
    }
}

/// Maps `virtual_path` under `home` and rejects it when the directory it
/// lives in resolves, through symlinks, to somewhere outside `home`.
///
/// The last component itself is not followed, so a link can still be
/// deleted or renamed but never traversed.
pub fn confined_real_path(home: &Path, virtual_path: &str) -> Result<PathBuf, StorageError> {
    let real = virtual_to_real_path(home, virtual_path);
    if real == home {
        return Ok(real);
    }

    let canonical_home = home.canonicalize()?;
    let mut probe = real.parent();
    while let Some(dir) = probe {
        // Nearest ancestor that exists decides.
        match dir.canonicalize() {
            Ok(resolved) if resolved.starts_with(&canonical_home) => return Ok(real),
            Ok(_) => break,
            Err(_) => probe = dir.parent(),
        }
    }
    Err(StorageError::InvalidPath(virtual_path.to_string()))
}
