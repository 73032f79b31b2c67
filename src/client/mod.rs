//! Client management system
//!
//! Handles per-connection session state and the control-connection loop.

pub mod handler;
pub mod session;

pub use handler::handle_client;
pub use session::Session;
