//! Persisted configuration
//!
//! Loads and saves the settings store (`settings.toml`, with `FTP_GATEKEEPER_*`
//! environment overrides) and the account store (`users.toml`). Loading never
//! fails: missing files and unparseable values fall back to defaults.
//!
//! Account records written before granular permissions existed carry only a
//! `write_permission` flag. They are migrated once, on load, into a
//! [`PermissionSet`]; saving always writes the full set alongside a derived flag.

use config::{Config, ConfigError, Environment, File};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::accounts::{AccountRegistry, UserAccount};
use crate::error::StoreError;
use crate::permissions::PermissionSet;
use crate::server::config::{
    DEFAULT_BIND_ADDRESS, DEFAULT_MAX_LOGINS, DEFAULT_PORT, ServerConfig, default_base_folder,
};
use crate::utils::network::is_valid_ip;

pub const DEFAULT_THEME: &str = "Flat Light";

const SETTINGS_FILE: &str = "settings.toml";
const USERS_FILE: &str = "users.toml";
const ENV_PREFIX: &str = "FTP_GATEKEEPER";

/// One account as it appears in `users.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAccount {
    pub username: String,
    pub password: String,
    pub home_directory: PathBuf,
    /// Legacy single write bit. Only consulted when `permissions` is absent.
    #[serde(default)]
    pub write_permission: bool,
    #[serde(default)]
    pub max_idle_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
}

impl StoredAccount {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            username: account.username().to_string(),
            password: account.password().to_string(),
            home_directory: account.home_directory().to_path_buf(),
            write_permission: account.legacy_write_permission(),
            max_idle_time: account.max_idle_time(),
            permissions: Some(account.permissions()),
        }
    }

    /// Converts to an account, deriving permissions from the legacy bit when
    /// the record predates granular permissions.
    pub fn into_account(self) -> UserAccount {
        let permissions = self
            .permissions
            .unwrap_or_else(|| PermissionSet::from_legacy(self.write_permission));
        UserAccount::new(
            self.username,
            self.password,
            self.home_directory,
            permissions,
            self.max_idle_time,
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    #[serde(default)]
    accounts: Vec<StoredAccount>,
}

#[derive(Serialize)]
struct SettingsFile<'a> {
    port: u32,
    bind_address: &'a str,
    max_logins: usize,
    anonymous_enabled: bool,
    base_folder: &'a Path,
    theme: &'a str,
}

/// Result of loading the persisted configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub theme: String,
}

/// Settings and account store rooted at one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.ftp-gatekeeper`, or `./.ftp-gatekeeper` without a home directory.
    pub fn default_location() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(".ftp-gatekeeper"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn users_path(&self) -> PathBuf {
        self.dir.join(USERS_FILE)
    }

    /// Whether a settings file has been saved.
    pub fn exists(&self) -> bool {
        self.settings_path().is_file()
    }

    /// Loads everything, substituting defaults for anything missing or malformed.
    pub fn load(&self) -> LoadedConfig {
        let settings = match self.read_settings() {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Ignoring settings store: {}", e);
                None
            }
        };
        let settings = settings.as_ref();

        let mut bind_address: String =
            setting(settings, "bind_address", DEFAULT_BIND_ADDRESS.to_string());
        if !is_valid_ip(&bind_address) {
            warn!("bind_address '{}' is not an IP literal, using {}", bind_address, DEFAULT_BIND_ADDRESS);
            bind_address = DEFAULT_BIND_ADDRESS.to_string();
        }

        let mut max_logins: usize = setting(settings, "max_logins", DEFAULT_MAX_LOGINS);
        if max_logins == 0 {
            warn!("max_logins must be positive, using {}", DEFAULT_MAX_LOGINS);
            max_logins = DEFAULT_MAX_LOGINS;
        }

        let server = ServerConfig {
            port: setting(settings, "port", DEFAULT_PORT),
            bind_address,
            max_concurrent_logins: max_logins,
            anonymous_enabled: setting(settings, "anonymous_enabled", false),
            base_folder: setting(settings, "base_folder", default_base_folder()),
            ..ServerConfig::default()
        };
        let theme = setting(settings, "theme", DEFAULT_THEME.to_string());

        let stored = match self.read_accounts() {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Ignoring account store: {}", e);
                Vec::new()
            }
        };

        let mut accounts = AccountRegistry::new();
        for record in stored {
            if let Err(e) = accounts.add(record.into_account()) {
                warn!("Skipping stored account: {}", e);
            }
        }
        info!("Loaded {} stored account(s) from {}", accounts.len(), self.dir.display());

        LoadedConfig {
            server: server.with_accounts(accounts),
            theme,
        }
    }

    /// Writes both stores, creating the directory if needed.
    pub fn save(&self, config: &ServerConfig, theme: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let settings = SettingsFile {
            port: config.port,
            bind_address: &config.bind_address,
            max_logins: config.max_concurrent_logins,
            anonymous_enabled: config.anonymous_enabled,
            base_folder: &config.base_folder,
            theme,
        };
        write_file(&self.settings_path(), &toml::to_string(&settings)?)?;

        let accounts = AccountFile {
            accounts: config.accounts.iter().map(StoredAccount::from_account).collect(),
        };
        write_file(&self.users_path(), &toml::to_string(&accounts)?)?;

        info!("Saved configuration to {}", self.dir.display());
        Ok(())
    }

    /// Removes both stores. Missing files are not an error.
    pub fn delete(&self) -> Result<(), StoreError> {
        for path in [self.settings_path(), self.users_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        Ok(())
    }

    fn read_settings(&self) -> Result<Config, StoreError> {
        let settings = Config::builder()
            .add_source(File::from(self.settings_path()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(settings)
    }

    fn read_accounts(&self) -> Result<Vec<StoredAccount>, StoreError> {
        let path = self.users_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io { path, source })?;
        let file: AccountFile = toml::from_str(&raw)?;
        Ok(file.accounts)
    }
}

/// Reads one key, falling back to `default` when it is absent or malformed.
fn setting<T: DeserializeOwned>(settings: Option<&Config>, key: &str, default: T) -> T {
    let Some(settings) = settings else {
        return default;
    };
    match settings.get::<T>(key) {
        Ok(value) => value,
        Err(ConfigError::NotFound(_)) => default,
        Err(e) => {
            warn!("Ignoring setting '{}': {}", key, e);
            default
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    fs::write(path, contents).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Capability;
    use tempfile::tempdir;

    #[test]
    fn test_missing_store_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("absent"));
        assert!(!store.exists());

        let loaded = store.load();
        assert_eq!(loaded.theme, DEFAULT_THEME);
        assert_eq!(loaded.server.port, DEFAULT_PORT);
        assert_eq!(loaded.server.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(loaded.server.max_concurrent_logins, DEFAULT_MAX_LOGINS);
        assert_eq!(loaded.server.accounts.len(), 1);
        assert!(loaded.server.accounts.find("admin").is_some());
    }

    #[test]
    fn test_malformed_values_fall_back_individually() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::write(
            store.settings_path(),
            "port = \"not a number\"\nmax_logins = 0\nbind_address = \"10.0.0.1\"\ntheme = \"Dark\"\n",
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.server.port, DEFAULT_PORT);
        assert_eq!(loaded.server.max_concurrent_logins, DEFAULT_MAX_LOGINS);
        assert_eq!(loaded.server.bind_address, "10.0.0.1");
        assert_eq!(loaded.theme, "Dark");
    }

    #[test]
    fn test_unparseable_account_store_keeps_admin() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::write(store.users_path(), "[[accounts]]\nusername = 42\n").unwrap();

        let loaded = store.load();
        assert_eq!(loaded.server.accounts.len(), 1);
        assert!(loaded.server.accounts.find("admin").is_some());
    }

    #[test]
    fn test_legacy_records_are_migrated() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::write(
            store.users_path(),
            r#"
[[accounts]]
username = "writer"
password = "w"
home_directory = "/srv/w"
write_permission = true
max_idle_time = 600

[[accounts]]
username = "reader"
password = "r"
home_directory = "/srv/r"
write_permission = false
max_idle_time = 0
"#,
        )
        .unwrap();

        let loaded = store.load();
        let accounts = &loaded.server.accounts;
        assert_eq!(accounts.len(), 2);
        assert!(accounts.find("admin").is_none());
        assert_eq!(accounts.find("writer").unwrap().permissions(), PermissionSet::full_access());
        assert_eq!(accounts.find("writer").unwrap().max_idle_time(), 600);
        assert_eq!(accounts.find("reader").unwrap().permissions(), PermissionSet::read_only());
    }

    #[test]
    fn test_stored_permissions_win_over_legacy_bit() {
        let record = StoredAccount {
            username: "mixed".into(),
            password: "m".into(),
            home_directory: "/m".into(),
            write_permission: true,
            max_idle_time: 0,
            permissions: Some(PermissionSet::none().with(Capability::List, true)),
        };
        let account = record.into_account();
        assert!(account.permissions().list());
        assert!(!account.permissions().read());
    }

    #[test]
    fn test_migration_is_idempotent_across_saves() {
        let legacy = StoredAccount {
            username: "old".into(),
            password: "o".into(),
            home_directory: "/o".into(),
            write_permission: false,
            max_idle_time: 30,
            permissions: None,
        };
        let first = legacy.into_account();
        let again = StoredAccount::from_account(&first).into_account();
        assert_eq!(again.permissions(), first.permissions());
        assert_eq!(StoredAccount::from_account(&again), StoredAccount::from_account(&first));
    }

    #[test]
    fn test_save_then_load_preserves_granular_permissions() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested"));

        let granular = PermissionSet::read_only().with(Capability::Rename, true);
        let mut accounts = AccountRegistry::new();
        accounts
            .add(UserAccount::new("ann", "pw", "/srv/ann", granular, 90))
            .unwrap();
        accounts
            .add(UserAccount::new("ro", "pw", "/srv/ro", PermissionSet::read_only(), 0))
            .unwrap();
        let config = ServerConfig {
            port: 2525,
            bind_address: "127.0.0.1".into(),
            max_concurrent_logins: 3,
            anonymous_enabled: true,
            base_folder: "/srv".into(),
            ..ServerConfig::default()
        }
        .with_accounts(accounts);

        store.save(&config, "Dark").unwrap();
        assert!(store.exists());

        let raw = fs::read_to_string(store.users_path()).unwrap();
        assert!(raw.contains("write_permission = true"));

        let loaded = store.load();
        assert_eq!(loaded.theme, "Dark");
        assert_eq!(loaded.server.port, 2525);
        assert_eq!(loaded.server.bind_address, "127.0.0.1");
        assert_eq!(loaded.server.max_concurrent_logins, 3);
        assert!(loaded.server.anonymous_enabled);
        assert_eq!(loaded.server.base_folder, PathBuf::from("/srv"));

        let names: Vec<&str> = loaded.server.accounts.iter().map(|a| a.username()).collect();
        assert_eq!(names, ["ann", "ro"]);
        let ann = loaded.server.accounts.find("ann").unwrap();
        assert_eq!(ann.permissions(), granular);
        assert_eq!(ann.max_idle_time(), 90);
    }

    #[test]
    fn test_delete_removes_store() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.save(&ServerConfig::default(), DEFAULT_THEME).unwrap();
        assert!(store.exists());

        store.delete().unwrap();
        assert!(!store.exists());
        assert!(!store.users_path().exists());
        store.delete().unwrap();
    }
}
