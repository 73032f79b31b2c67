//! Error handling
//!
//! Defines error types and handling for the server core and its collaborators.

pub mod handlers;
pub mod types;

pub use types::*;
