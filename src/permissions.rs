//! Module `permissions`
//!
//! Defines the `PermissionSet` value type: seven independent capabilities that
//! describe which file operations an account may perform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single named permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    Write,
    Delete,
    Rename,
    CreateDirectory,
    RemoveDirectory,
    List,
}

impl Capability {
    /// Every capability, in display order.
    pub const ALL: [Capability; 7] = [
        Capability::Read,
        Capability::Write,
        Capability::Delete,
        Capability::Rename,
        Capability::CreateDirectory,
        Capability::RemoveDirectory,
        Capability::List,
    ];

    /// Returns whether this capability counts towards write access.
    pub fn is_write_class(self) -> bool {
        !matches!(self, Capability::Read | Capability::List)
    }

    fn label(self) -> &'static str {
        match self {
            Capability::Read => "Read",
            Capability::Write => "Write",
            Capability::Delete => "Delete",
            Capability::Rename => "Rename",
            Capability::CreateDirectory => "CreateDir",
            Capability::RemoveDirectory => "RemoveDir",
            Capability::List => "List",
        }
    }
}

/// Immutable set of file-operation capabilities.
///
/// Edits go through [`PermissionSet::with`], which returns a new value.
/// The default value is the read-only preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSet {
    read: bool,
    write: bool,
    delete: bool,
    rename: bool,
    create_directory: bool,
    remove_directory: bool,
    list: bool,
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self::read_only()
    }
}

impl PermissionSet {
    /// All seven capabilities granted.
    pub const fn full_access() -> Self {
        Self {
            read: true,
            write: true,
            delete: true,
            rename: true,
            create_directory: true,
            remove_directory: true,
            list: true,
        }
    }

    /// Only `read` and `list` granted.
    pub const fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            delete: false,
            rename: false,
            create_directory: false,
            remove_directory: false,
            list: true,
        }
    }

    /// No capability granted.
    pub const fn none() -> Self {
        Self {
            read: false,
            write: false,
            delete: false,
            rename: false,
            create_directory: false,
            remove_directory: false,
            list: false,
        }
    }

    /// Maps the pre-granular single write bit onto a preset.
    pub const fn from_legacy(write_permission: bool) -> Self {
        if write_permission {
            Self::full_access()
        } else {
            Self::read_only()
        }
    }

    /// Returns a copy with `capability` set to `granted`.
    pub fn with(self, capability: Capability, granted: bool) -> Self {
        let mut next = self;
        match capability {
            Capability::Read => next.read = granted,
            Capability::Write => next.write = granted,
            Capability::Delete => next.delete = granted,
            Capability::Rename => next.rename = granted,
            Capability::CreateDirectory => next.create_directory = granted,
            Capability::RemoveDirectory => next.remove_directory = granted,
            Capability::List => next.list = granted,
        }
        next
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.read,
            Capability::Write => self.write,
            Capability::Delete => self.delete,
            Capability::Rename => self.rename,
            Capability::CreateDirectory => self.create_directory,
            Capability::RemoveDirectory => self.remove_directory,
            Capability::List => self.list,
        }
    }

    pub fn read(&self) -> bool {
        self.read
    }

    pub fn write(&self) -> bool {
        self.write
    }

    pub fn delete(&self) -> bool {
        self.delete
    }

    pub fn rename(&self) -> bool {
        self.rename
    }

    pub fn create_directory(&self) -> bool {
        self.create_directory
    }

    pub fn remove_directory(&self) -> bool {
        self.remove_directory
    }

    pub fn list(&self) -> bool {
        self.list
    }

    /// True when any capability other than `read` and `list` is granted.
    pub fn has_write_access(&self) -> bool {
        self.write || self.delete || self.rename || self.create_directory || self.remove_directory
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let granted: Vec<&str> = Capability::ALL
            .iter()
            .filter(|cap| self.allows(**cap))
            .map(|cap| cap.label())
            .collect();
        write!(f, "{}", granted.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds the permission set whose bit `i` maps to `Capability::ALL[i]`.
    fn from_mask(mask: u8) -> PermissionSet {
        Capability::ALL
            .iter()
            .enumerate()
            .fold(PermissionSet::none(), |set, (i, cap)| {
                set.with(*cap, mask & (1 << i) != 0)
            })
    }

    #[test]
    fn test_full_access_grants_everything() {
        let perms = PermissionSet::full_access();
        assert!(Capability::ALL.iter().all(|cap| perms.allows(*cap)));
        assert!(perms.has_write_access());
    }

    #[test]
    fn test_read_only_grants_read_and_list() {
        let perms = PermissionSet::read_only();
        for cap in Capability::ALL {
            let expected = matches!(cap, Capability::Read | Capability::List);
            assert_eq!(perms.allows(cap), expected, "{cap:?}");
        }
        assert!(!perms.has_write_access());
    }

    #[test]
    fn test_has_write_access_over_all_combinations() {
        for mask in 0u8..128 {
            let perms = from_mask(mask);
            let expected = Capability::ALL
                .iter()
                .any(|cap| cap.is_write_class() && perms.allows(*cap));
            assert_eq!(perms.has_write_access(), expected, "mask {mask:#09b}");
        }
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let base = PermissionSet::read_only();
        let edited = base.with(Capability::Delete, true);
        assert!(!base.delete());
        assert!(edited.delete());
        assert!(edited.read() && edited.list());
    }

    #[test]
    fn test_legacy_mapping() {
        assert_eq!(PermissionSet::from_legacy(true), PermissionSet::full_access());
        assert_eq!(PermissionSet::from_legacy(false), PermissionSet::read_only());
    }

    #[test]
    fn test_display_lists_granted_capabilities() {
        assert_eq!(PermissionSet::read_only().to_string(), "Read List");
        assert_eq!(PermissionSet::none().to_string(), "");
        assert_eq!(
            PermissionSet::full_access().to_string(),
            "Read Write Delete Rename CreateDir RemoveDir List"
        );
    }
}
