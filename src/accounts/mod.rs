//! Account management
//!
//! Holds the user accounts a server configuration is built from.

pub mod account;
pub mod registry;

pub use account::{DEFAULT_MAX_IDLE_TIME, UserAccount};
pub use registry::AccountRegistry;
