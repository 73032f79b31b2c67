//! FTP Response handling
//!
//! Defines FTP reply codes and formatting.

/// Standard FTP reply codes
pub const OK: u16 = 200;
pub const NOT_IMPLEMENTED_SUPERFLUOUS: u16 = 202;
pub const SYSTEM_TYPE: u16 = 215;
pub const CLOSING: u16 = 221;
pub const LOGIN_SUCCESS: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATH_CREATED: u16 = 257;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const PENDING_FURTHER_INFO: u16 = 350;
pub const SERVICE_UNAVAILABLE: u16 = 421;
pub const CANT_OPEN_DATA: u16 = 425;
pub const SYNTAX_ERROR: u16 = 500;
pub const SYNTAX_ERROR_ARGS: u16 = 501;
pub const NOT_IMPLEMENTED: u16 = 502;
pub const BAD_SEQUENCE: u16 = 503;
pub const NOT_LOGGED_IN: u16 = 530;
pub const ACTION_NOT_TAKEN: u16 = 550;

/// Format an FTP response message
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_response() {
        assert_eq!(format_response(NOT_LOGGED_IN, "Not logged in"), "530 Not logged in\r\n");
    }
}
