//! Error types
//!
//! Defines domain-specific error types for each module of the server.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Lifecycle manager errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Server is already running")]
    AlreadyRunning,

    #[error("Invalid port {0}: must be between 1 and 65535")]
    InvalidPort(u32),

    #[error("max_concurrent_logins must be greater than 0")]
    InvalidMaxLogins,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors raised by a transport while attaching its listener
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read bound address: {0}")]
    LocalAddr(#[source] io::Error),
}

/// Account registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("An account named '{0}' already exists")]
    DuplicateUsername(String),
}

/// Storage errors raised while a session acts on its home directory
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Persisted-configuration errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Configuration IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Malformed account store: {0}")]
    Accounts(#[from] toml::de::Error),

    #[error("Failed to encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),
}
