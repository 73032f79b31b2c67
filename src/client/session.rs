//! Module `session`
//!
//! Defines the `Session` struct tracking one control connection: the pending
//! username, the authenticated user, the virtual working directory, and a
//! pending rename source.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::server::transport::TransportUser;

/// Represents the state of a connected FTP client.
pub struct Session {
    pending_user: Option<String>,
    user: Option<Arc<TransportUser>>,
    current_virtual_path: String,
    rename_from: Option<(PathBuf, String)>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            pending_user: None,
            user: None,
            current_virtual_path: "/".to_string(),
            rename_from: None,
        }
    }
}

impl Session {
    /// Resets the session, logging out and clearing all stored data.
    pub fn logout(&mut self) {
        *self = Self::default();
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns whether the client has successfully logged in.
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Username given to `USER`, awaiting `PASS`.
    pub fn pending_user(&self) -> Option<&str> {
        self.pending_user.as_deref()
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&Arc<TransportUser>> {
        self.user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username())
    }

    /// Returns the current virtual path of the client.
    pub fn current_virtual_path(&self) -> &str {
        &self.current_virtual_path
    }

    /// Read timeout for the next command: the user's idle limit once logged in.
    pub fn idle_timeout(&self) -> Option<Duration> {
        match &self.user {
            Some(user) if user.max_idle_time() > 0 => {
                Some(Duration::from_secs(u64::from(user.max_idle_time())))
            }
            _ => None,
        }
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_pending_user(&mut self, username: Option<String>) {
        self.pending_user = username;
    }

    /// Completes login; the working directory resets to the home root.
    pub fn login(&mut self, user: Arc<TransportUser>) {
        self.pending_user = None;
        self.current_virtual_path = "/".to_string();
        self.rename_from = None;
        self.user = Some(user);
    }

    /// Sets the current virtual path of the client.
    pub fn set_current_virtual_path(&mut self, path: String) {
        self.current_virtual_path = path;
    }

    pub fn set_rename_from(&mut self, real: PathBuf, virtual_path: String) {
        self.rename_from = Some((real, virtual_path));
    }

    pub fn take_rename_from(&mut self) -> Option<(PathBuf, String)> {
        self.rename_from.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::UserAccount;
    use crate::permissions::PermissionSet;

    fn user(idle: u32) -> Arc<TransportUser> {
        Arc::new(TransportUser::from_account(&UserAccount::new(
            "bob",
            "pw",
            "/home/bob",
            PermissionSet::read_only(),
            idle,
        )))
    }

    #[test]
    fn test_login_and_logout() {
        let mut session = Session::default();
        session.set_pending_user(Some("bob".into()));
        session.set_current_virtual_path("/elsewhere".into());
        session.login(user(0));

        assert!(session.is_logged_in());
        assert_eq!(session.username(), Some("bob"));
        assert_eq!(session.pending_user(), None);
        assert_eq!(session.current_virtual_path(), "/");

        session.logout();
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_idle_timeout_follows_user() {
        let mut session = Session::default();
        assert_eq!(session.idle_timeout(), None);

        session.login(user(0));
        assert_eq!(session.idle_timeout(), None);

        session.login(user(45));
        assert_eq!(session.idle_timeout(), Some(Duration::from_secs(45)));
    }
}
