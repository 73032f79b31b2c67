//! Logging utilities
//!
//! Provides logging setup and configuration.

use log::LevelFilter;

/// Setup logging for the server, defaulting to `info` when `RUST_LOG` is unset
pub fn setup_logging() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}
