//! FTP Protocol implementation
//!
//! Handles FTP command parsing, classification, authorization and response
//! generation for the control connection.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus};
pub use handlers::handle_command;
pub use parser::parse_command;
