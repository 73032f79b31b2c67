//! Account registry
//!
//! Owns the ordered account list of a configuration. No two entries ever
//! share a username.

use log::debug;

use super::UserAccount;
use crate::error::RegistryError;

/// Ordered collection of accounts keyed by username.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<UserAccount>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding exactly `account`.
    pub fn seeded(account: UserAccount) -> Self {
        Self {
            accounts: vec![account],
        }
    }

    /// Appends `account`. A colliding username is rejected; use
    /// [`AccountRegistry::update`] to replace an entry.
    pub fn add(&mut self, account: UserAccount) -> Result<(), RegistryError> {
        if self.position(account.username()).is_some() {
            return Err(RegistryError::DuplicateUsername(account.username().to_string()));
        }
        debug!("Registered account {}", account);
        self.accounts.push(account);
        Ok(())
    }

    /// Removes the entry with the same username. Returns whether one was removed.
    pub fn remove(&mut self, account: &UserAccount) -> bool {
        match self.position(account.username()) {
            Some(index) => {
                self.accounts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the entry matching `old` in place with `new`.
    ///
    /// Returns `Ok(false)` when `old` is absent. Renaming onto a username held
    /// by a different entry is rejected.
    pub fn update(&mut self, old: &UserAccount, new: UserAccount) -> Result<bool, RegistryError> {
        let Some(index) = self.position(old.username()) else {
            return Ok(false);
        };

        if let Some(other) = self.position(new.username()) {
            if other != index {
                return Err(RegistryError::DuplicateUsername(new.username().to_string()));
            }
        }

        self.accounts[index] = new;
        Ok(true)
    }

    /// Current accounts, in insertion order.
    pub fn all(&self) -> &[UserAccount] {
        &self.accounts
    }

    pub fn find(&self, username: &str) -> Option<&UserAccount> {
        self.accounts.iter().find(|a| a.username() == username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserAccount> {
        self.accounts.iter()
    }

    fn position(&self, username: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.username() == username)
    }
}

impl<'a> IntoIterator for &'a AccountRegistry {
    type Item = &'a UserAccount;
    type IntoIter = std::slice::Iter<'a, UserAccount>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
