//! FTP gatekeeper
//!
//! Server-lifecycle and authorization core for an FTP server: granular
//! per-account permissions, a Running/Stopped lifecycle with status
//! notifications, and a tokio control-connection transport that enforces
//! the permissions on every request.

pub mod accounts;
pub mod authz;
pub mod client;
pub mod error;
pub mod permissions;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod store;
pub mod utils;

pub use accounts::{AccountRegistry, UserAccount};
pub use authz::{AuthorizationHook, Decision, RequestClassification, authorize};
pub use error::{RegistryError, ServerError, StoreError, TransportError};
pub use permissions::{Capability, PermissionSet};
pub use server::{FtpTransport, LifecycleManager, ServerConfig, StartReport, StatusEvent};
pub use store::ConfigStore;
