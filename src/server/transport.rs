//! Transport seam
//!
//! What the lifecycle manager hands to the component that actually serves
//! connections: the listener address, login limits, and the materialized user
//! store with one authorization hook per account.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::accounts::{DEFAULT_MAX_IDLE_TIME, UserAccount};
use crate::authz::{AuthorizationHook, Decision, RequestClassification};
use crate::error::TransportError;
use crate::permissions::PermissionSet;
use crate::utils::network::socket_string;

/// Login name accepted for anonymous sessions when they are enabled.
pub const ANONYMOUS_USER: &str = "anonymous";

/// An account as installed into the transport's user store.
#[derive(Debug, Clone)]
pub struct TransportUser {
    username: String,
    password: String,
    home_directory: PathBuf,
    max_idle_time: u32,
    hook: AuthorizationHook,
}

impl TransportUser {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            username: account.username().to_string(),
            password: account.password().to_string(),
            home_directory: account.home_directory().to_path_buf(),
            max_idle_time: account.max_idle_time(),
            hook: AuthorizationHook::new(account.permissions()),
        }
    }

    /// Passwordless read-only user homed at `base_folder`.
    pub fn anonymous(base_folder: &Path) -> Self {
        Self {
            username: ANONYMOUS_USER.to_string(),
            password: String::new(),
            home_directory: base_folder.to_path_buf(),
            max_idle_time: DEFAULT_MAX_IDLE_TIME,
            hook: AuthorizationHook::new(PermissionSet::read_only()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn home_directory(&self) -> &Path {
        &self.home_directory
    }

    pub fn max_idle_time(&self) -> u32 {
        self.max_idle_time
    }

    pub fn hook(&self) -> &AuthorizationHook {
        &self.hook
    }

    pub fn authorize(&self, classification: RequestClassification) -> Decision {
        self.hook.authorize(classification)
    }
}

/// Immutable username → user lookup shared by every session of a listener.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, Arc<TransportUser>>,
    anonymous: Option<Arc<TransportUser>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: TransportUser) {
        self.users.insert(user.username.clone(), Arc::new(user));
    }

    pub fn enable_anonymous(&mut self, user: TransportUser) {
        self.anonymous = Some(Arc::new(user));
    }

    pub fn get(&self, username: &str) -> Option<Arc<TransportUser>> {
        self.users.get(username).cloned()
    }

    /// Checks credentials. Configured accounts shadow the anonymous login.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Arc<TransportUser>> {
        match self.users.get(username) {
            Some(user) if user.password == password => Some(Arc::clone(user)),
            Some(_) => None,
            None => self.anonymous_for(username),
        }
    }

    /// Inbound authorization by username. An unknown user is denied.
    pub fn authorize(&self, username: &str, classification: RequestClassification) -> Decision {
        let user = self
            .users
            .get(username)
            .cloned()
            .or_else(|| self.anonymous_for(username));
        match user {
            Some(user) => user.authorize(classification),
            None => Decision::Deny,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn anonymous_for(&self, username: &str) -> Option<Arc<TransportUser>> {
        if username.eq_ignore_ascii_case(ANONYMOUS_USER) {
            self.anonymous.clone()
        } else {
            None
        }
    }
}

/// Everything a transport needs to start serving.
#[derive(Debug, Clone)]
pub struct ListenerSpec {
    pub bind_address: String,
    pub port: u16,
    pub max_logins: usize,
    pub users: UserStore,
}

impl ListenerSpec {
    pub fn socket_addr(&self) -> String {
        socket_string(&self.bind_address, u32::from(self.port))
    }
}

/// The serving side the lifecycle manager drives.
pub trait Transport: Send + 'static {
    /// Binds the listener and begins serving. Returns the bound address.
    fn start(
        &mut self,
        spec: ListenerSpec,
    ) -> impl Future<Output = Result<SocketAddr, TransportError>> + Send;

    /// Stops serving and releases the listener. Must be idempotent.
    fn stop(&mut self) -> impl Future<Output = ()> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        let mut store = UserStore::new();
        store.insert(TransportUser::from_account(&UserAccount::new(
            "writer",
            "pw",
            "/w",
            PermissionSet::full_access(),
            60,
        )));
        store.insert(TransportUser::from_account(&UserAccount::new(
            "reader",
            "pw",
            "/r",
            PermissionSet::read_only(),
            0,
        )));
        store
    }

    #[test]
    fn test_authenticate() {
        let store = store();
        assert!(store.authenticate("writer", "pw").is_some());
        assert!(store.authenticate("writer", "PW").is_none());
        assert!(store.authenticate("nobody", "pw").is_none());
    }

    #[test]
    fn test_authorize_by_username() {
        let store = store();
        assert_eq!(
            store.authorize("writer", RequestClassification::Delete),
            Decision::Allow
        );
        assert_eq!(
            store.authorize("reader", RequestClassification::Delete),
            Decision::Deny
        );
        assert_eq!(
            store.authorize("reader", RequestClassification::List),
            Decision::Allow
        );
    }

    #[test]
    fn test_unknown_user_is_denied() {
        let store = store();
        assert_eq!(
            store.authorize("ghost", RequestClassification::Read),
            Decision::Deny
        );
    }

    #[test]
    fn test_anonymous_only_when_enabled() {
        let mut store = store();
        assert!(store.authenticate(ANONYMOUS_USER, "").is_none());
        assert_eq!(store.authorize(ANONYMOUS_USER, RequestClassification::Read), Decision::Deny);

        store.enable_anonymous(TransportUser::anonymous(Path::new("/pub")));
        let anon = store.authenticate("Anonymous", "guest@example.com").unwrap();
        assert_eq!(anon.home_directory(), Path::new("/pub"));
        assert_eq!(anon.authorize(RequestClassification::Write), Decision::Deny);
        assert_eq!(anon.authorize(RequestClassification::Read), Decision::Allow);
    }

    #[test]
    fn test_passes_idle_time_through() {
        let store = store();
        assert_eq!(store.get("writer").unwrap().max_idle_time(), 60);
        assert_eq!(store.get("reader").unwrap().max_idle_time(), 0);
    }
}
