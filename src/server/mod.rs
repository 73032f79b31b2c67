//! Server core functionality
//!
//! This module contains the lifecycle manager, its configuration, status
//! notifications and the transport it drives.

pub mod config;
pub mod listener;
pub mod manager;
pub mod status;
pub mod transport;

pub use config::ServerConfig;
pub use listener::FtpTransport;
pub use manager::{LifecycleManager, StartReport};
pub use status::{StatusBroadcaster, StatusEvent, StatusObserver};
pub use transport::{ListenerSpec, Transport, TransportUser, UserStore};
