//! Error handlers
//!
//! Maps errors onto FTP reply codes.

use crate::error::types::StorageError;

/// Convert a storage error to an FTP reply code
pub fn error_to_ftp_code(err: &StorageError) -> u16 {
    match err {
        StorageError::FileNotFound(_) => 550,
        StorageError::DirectoryNotFound(_) => 550,
        StorageError::NotADirectory(_) => 550,
        StorageError::AlreadyExists(_) => 550,
        StorageError::InvalidPath(_) => 553,
        StorageError::IoError(_) => 451,
    }
}

/// Format a storage error as a complete FTP reply line
pub fn error_reply(err: &StorageError) -> String {
    format!("{} {}\r\n", error_to_ftp_code(err), err)
}
