//! Server configuration
//!
//! The configuration the lifecycle manager applies on start: listener address,
//! login limits, anonymous access, base folder and the account list.

use std::path::PathBuf;

use crate::accounts::{AccountRegistry, UserAccount};
use crate::error::ServerError;
use crate::utils::network::socket_string;

pub const DEFAULT_PORT: u32 = 2121;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_MAX_LOGINS: usize = 10;

/// Server configuration structure
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Control port. Kept wide so out-of-range values survive until validation.
    pub port: u32,
    /// Literal address or wildcard (`0.0.0.0`, `::`).
    pub bind_address: String,
    pub max_concurrent_logins: usize,
    pub anonymous_enabled: bool,
    /// Default home for newly created accounts and for anonymous sessions.
    pub base_folder: PathBuf,
    pub accounts: AccountRegistry,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let base_folder = default_base_folder();
        let accounts = AccountRegistry::seeded(UserAccount::default_admin(base_folder.clone()));

        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_concurrent_logins: DEFAULT_MAX_LOGINS,
            anonymous_enabled: false,
            base_folder,
            accounts,
        }
    }
}

impl ServerConfig {
    /// Replaces the account list. An empty list falls back to the seeded admin.
    pub fn with_accounts(mut self, accounts: AccountRegistry) -> Self {
        self.accounts = if accounts.is_empty() {
            AccountRegistry::seeded(UserAccount::default_admin(self.base_folder.clone()))
        } else {
            accounts
        };
        self
    }

    /// Get bind address and control port as a socket address string
    pub fn control_socket(&self) -> String {
        socket_string(&self.bind_address, self.port)
    }

    /// Returns the validated control port.
    pub fn validated_port(&self) -> Result<u16, ServerError> {
        match u16::try_from(self.port) {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(ServerError::InvalidPort(self.port)),
        }
    }

    /// Validation for all values the lifecycle manager depends on
    pub fn validate(&self) -> Result<(), ServerError> {
        self.validated_port()?;
        if self.max_concurrent_logins == 0 {
            return Err(ServerError::InvalidMaxLogins);
        }
        Ok(())
    }
}

/// `<home>/ftp`, or `./ftp` when no home directory is known.
pub fn default_base_folder() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ftp")
}
