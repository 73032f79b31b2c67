//! Module `account`
//!
//! Defines `UserAccount`, binding credentials, a home directory, a permission
//! set and an idle timeout. Identity is the username alone.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::permissions::PermissionSet;

/// Idle timeout given to seeded and anonymous accounts, in seconds.
pub const DEFAULT_MAX_IDLE_TIME: u32 = 300;

/// A configured FTP account.
#[derive(Clone)]
pub struct UserAccount {
    username: String,
    password: String,
    home_directory: PathBuf,
    permissions: PermissionSet,
    max_idle_time: u32,
}

impl UserAccount {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        home_directory: impl Into<PathBuf>,
        permissions: PermissionSet,
        max_idle_time: u32,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            home_directory: home_directory.into(),
            permissions,
            max_idle_time,
        }
    }

    /// The account every fresh configuration is seeded with.
    pub fn default_admin(base_folder: impl Into<PathBuf>) -> Self {
        Self::new(
            "admin",
            "admin",
            base_folder,
            PermissionSet::full_access(),
            DEFAULT_MAX_IDLE_TIME,
        )
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn home_directory(&self) -> &Path {
        &self.home_directory
    }

    pub fn permissions(&self) -> PermissionSet {
        self.permissions
    }

    /// Idle timeout in seconds; 0 disables it.
    pub fn max_idle_time(&self) -> u32 {
        self.max_idle_time
    }

    /// The single write bit older account stores carry. Derived, never stored.
    pub fn legacy_write_permission(&self) -> bool {
        self.permissions.has_write_access()
    }

    /// Compares the stored secret verbatim.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    // --------------------
    // Copy-on-edit helpers
    // --------------------

    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_home_directory(mut self, home_directory: impl Into<PathBuf>) -> Self {
        self.home_directory = home_directory.into();
        self
    }

    pub fn with_max_idle_time(mut self, max_idle_time: u32) -> Self {
        self.max_idle_time = max_idle_time;
        self
    }
}

impl PartialEq for UserAccount {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for UserAccount {}

impl Hash for UserAccount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.username.hash(state);
    }
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("username", &self.username)
            .field("password", &"***")
            .field("home_directory", &self.home_directory)
            .field("permissions", &self.permissions)
            .field("max_idle_time", &self.max_idle_time)
            .finish()
    }
}

impl fmt::Display for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.home_directory.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_username_only() {
        let a = UserAccount::new("bob", "one", "/a", PermissionSet::read_only(), 10);
        let b = UserAccount::new("bob", "two", "/b", PermissionSet::full_access(), 0);
        assert_eq!(a, b);

        let set: HashSet<UserAccount> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_username_is_case_sensitive() {
        let a = UserAccount::new("Bob", "x", "/a", PermissionSet::read_only(), 0);
        let b = UserAccount::new("bob", "x", "/a", PermissionSet::read_only(), 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_admin() {
        let admin = UserAccount::default_admin("/srv/ftp");
        assert_eq!(admin.username(), "admin");
        assert!(admin.password_matches("admin"));
        assert_eq!(admin.permissions(), PermissionSet::full_access());
        assert_eq!(admin.max_idle_time(), 300);
        assert_eq!(admin.home_directory(), Path::new("/srv/ftp"));
    }

    #[test]
    fn test_legacy_bit_is_derived() {
        let account = UserAccount::default_admin("/srv");
        assert!(account.legacy_write_permission());
        let account = account.with_permissions(PermissionSet::read_only());
        assert!(!account.legacy_write_permission());
    }

    #[test]
    fn test_debug_hides_password() {
        let account = UserAccount::new("eve", "hunter2", "/e", PermissionSet::none(), 0);
        assert!(!format!("{account:?}").contains("hunter2"));
    }
}
