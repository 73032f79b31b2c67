//! Authorization engine
//!
//! The single decision point for "may this user perform this operation".
//! Everything here is pure and safe to call from any number of sessions at once.

use std::fmt;

use crate::permissions::{Capability, PermissionSet};

/// Operation kind a transport assigns to an inbound file-operation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClassification {
    Read,
    Write,
    Delete,
    Rename,
    CreateDirectory,
    RemoveDirectory,
    List,
    /// Any operation the transport does not classify.
    Unknown,
}

impl RequestClassification {
    /// The capability a request of this kind is judged against, if it maps to one.
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            RequestClassification::Read => Some(Capability::Read),
            RequestClassification::Write => Some(Capability::Write),
            RequestClassification::Delete => Some(Capability::Delete),
            RequestClassification::Rename => Some(Capability::Rename),
            RequestClassification::CreateDirectory => Some(Capability::CreateDirectory),
            RequestClassification::RemoveDirectory => Some(Capability::RemoveDirectory),
            RequestClassification::List => Some(Capability::List),
            RequestClassification::Unknown => None,
        }
    }
}

impl fmt::Display for RequestClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed { Decision::Allow } else { Decision::Deny }
    }
}

/// Decides whether `permissions` admit a request of kind `classification`.
///
/// Unclassified requests are treated as privileged: they pass only for
/// accounts holding some write-class capability.
pub fn authorize(classification: RequestClassification, permissions: &PermissionSet) -> Decision {
    let allowed = match classification {
        RequestClassification::Read => permissions.read(),
        RequestClassification::Write => permissions.write(),
        RequestClassification::Delete => permissions.delete(),
        RequestClassification::Rename => permissions.rename(),
        RequestClassification::CreateDirectory => permissions.create_directory(),
        RequestClassification::RemoveDirectory => permissions.remove_directory(),
        RequestClassification::List => permissions.list(),
        RequestClassification::Unknown => permissions.has_write_access(),
    };
    Decision::from(allowed)
}

/// Authorization hook bound to one account's permissions, installed into the
/// transport's user store at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationHook {
    permissions: PermissionSet,
}

impl AuthorizationHook {
    pub fn new(permissions: PermissionSet) -> Self {
        Self { permissions }
    }

    /// Every classification can be judged; the hook never defers.
    pub fn can_authorize(&self, _classification: RequestClassification) -> bool {
        true
    }

    pub fn authorize(&self, classification: RequestClassification) -> Decision {
        authorize(classification, &self.permissions)
    }

    pub fn permissions(&self) -> PermissionSet {
        self.permissions
    }
}
