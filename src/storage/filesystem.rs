//! File system operations
//!
//! Home directory provisioning for the lifecycle manager, and the file
//! operations a session performs once a request has been authorized.

use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::accounts::UserAccount;
use crate::error::StorageError;

/// An account whose home directory could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningFailure {
    pub username: String,
    pub home_directory: PathBuf,
    pub reason: String,
}

/// Creates `path` and its parents if missing.
pub fn ensure_home_directory(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)?;
    info!("Created home directory {}", path.display());
    Ok(())
}

/// Ensures every account's home directory exists.
///
/// A failure is recorded against its account and does not stop the others.
/// Returns the accounts that are ready, in order, and the failures.
pub fn provision_home_directories<'a, I>(accounts: I) -> (Vec<&'a UserAccount>, Vec<ProvisioningFailure>)
where
    I: IntoIterator<Item = &'a UserAccount>,
{
    let mut ready = Vec::new();
    let mut failures = Vec::new();

    for account in accounts {
        match ensure_home_directory(account.home_directory()) {
            Ok(()) => ready.push(account),
            Err(e) => {
                warn!(
                    "Failed to create home directory {} for {}: {}",
                    account.home_directory().display(),
                    account.username(),
                    e
                );
                failures.push(ProvisioningFailure {
                    username: account.username().to_string(),
                    home_directory: account.home_directory().to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (ready, failures)
}

/// Deletes a regular file.
pub fn delete_file(path: &Path, virtual_path: &str) -> Result<(), StorageError> {
    if !path.exists() {
        return Err(StorageError::FileNotFound(virtual_path.to_string()));
    }
    if !path.is_file() {
        return Err(StorageError::InvalidPath(virtual_path.to_string()));
    }
    fs::remove_file(path)?;
    Ok(())
}

/// Creates a single directory whose parent must already exist.
pub fn create_directory(path: &Path, virtual_path: &str) -> Result<(), StorageError> {
    if path.exists() {
        return Err(StorageError::AlreadyExists(virtual_path.to_string()));
    }
    fs::create_dir(path)?;
    Ok(())
}

/// Removes an empty directory.
pub fn remove_directory(path: &Path, virtual_path: &str) -> Result<(), StorageError> {
    if !path.exists() {
        return Err(StorageError::DirectoryNotFound(virtual_path.to_string()));
    }
    if !path.is_dir() {
        return Err(StorageError::NotADirectory(virtual_path.to_string()));
    }
    fs::remove_dir(path)?;
    Ok(())
}

/// Renames `from` to `to`, refusing to overwrite.
pub fn rename_path(from: &Path, to: &Path, to_virtual: &str) -> Result<(), StorageError> {
    if to.exists() {
        return Err(StorageError::AlreadyExists(to_virtual.to_string()));
    }
    fs::rename(from, to)?;
    Ok(())
}

/// Checks that `path` is an existing directory.
pub fn require_directory(path: &Path, virtual_path: &str) -> Result<(), StorageError> {
    if !path.exists() {
        return Err(StorageError::DirectoryNotFound(virtual_path.to_string()));
    }
    if !path.is_dir() {
        return Err(StorageError::NotADirectory(virtual_path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::PermissionSet;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_creates_nested_directories() {
        let dir = tempdir().unwrap();
        let home = dir.path().join("a/b/c");
        ensure_home_directory(&home).unwrap();
        assert!(home.is_dir());
        ensure_home_directory(&home).unwrap();
    }

    #[test]
    fn test_provisioning_failure_is_per_account() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let good = UserAccount::new("good", "x", dir.path().join("good"), PermissionSet::read_only(), 0);
        let bad = UserAccount::new("bad", "x", blocker.join("home"), PermissionSet::read_only(), 0);
        let also_good = UserAccount::new("also", "x", dir.path().join("also"), PermissionSet::read_only(), 0);
        let accounts = [good, bad, also_good];

        let (ready, failures) = provision_home_directories(&accounts);

        let ready: Vec<&str> = ready.iter().map(|a| a.username()).collect();
        assert_eq!(ready, ["good", "also"]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].username, "bad");
        assert_eq!(failures[0].home_directory, blocker.join("home"));
        assert!(dir.path().join("also").is_dir());
    }

    #[test]
    fn test_file_operations() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        create_directory(&sub, "/sub").unwrap();
        assert!(matches!(create_directory(&sub, "/sub"), Err(StorageError::AlreadyExists(_))));

        let file = sub.join("f.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(remove_directory(&file, "/sub/f.txt"), Err(StorageError::NotADirectory(_))));

        let renamed = sub.join("g.txt");
        rename_path(&file, &renamed, "/sub/g.txt").unwrap();
        assert!(renamed.exists() && !file.exists());

        delete_file(&renamed, "/sub/g.txt").unwrap();
        assert!(matches!(delete_file(&renamed, "/sub/g.txt"), Err(StorageError::FileNotFound(_))));

        remove_directory(&sub, "/sub").unwrap();
        assert!(!sub.exists());
    }
}
