//! Network utilities
//!
//! Provides network-related utility functions.

use std::net::IpAddr;

/// Joins a host and port, bracketing IPv6 literals.
pub fn socket_string(host: &str, port: u32) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Validate IP address
pub fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_string() {
        assert_eq!(socket_string("0.0.0.0", 2121), "0.0.0.0:2121");
        assert_eq!(socket_string("::", 21), "[::]:21");
    }

    #[test]
    fn test_is_valid_ip() {
        assert!(is_valid_ip("127.0.0.1"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("localhost"));
    }
}
