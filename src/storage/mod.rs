//! File system storage management
//!
//! Handles home directory provisioning, path resolution, and the file
//! operations sessions perform inside a home directory.

pub mod filesystem;
pub mod validation;

pub use filesystem::{ProvisioningFailure, ensure_home_directory, provision_home_directories};
pub use validation::{confined_real_path, resolve_virtual_path, virtual_to_real_path};
