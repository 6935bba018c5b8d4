// src/net/address.rs
//! Dotted-quad IPv4 validation and parsing.

use std::net::Ipv4Addr;

/// True for exactly four dot-separated segments, each 0-255.
pub fn validate_address(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let segments: Vec<&str> = text.split('.').collect();
    segments.len() == 4 && segments.iter().all(|s| s.parse::<u8>().is_ok())
}

/// Parse a dotted quad. Anything unparseable becomes `0.0.0.0`,
/// which callers must treat as "no address".
pub fn parse_address(text: &str) -> Ipv4Addr {
    if !validate_address(text) {
        return Ipv4Addr::UNSPECIFIED;
    }
    let mut octets = [0u8; 4];
    for (slot, segment) in octets.iter_mut().zip(text.split('.')) {
        match segment.parse() {
            Ok(value) => *slot = value,
            Err(_) => return Ipv4Addr::UNSPECIFIED,
        }
    }
    Ipv4Addr::from(octets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_quads() {
        for ok in ["0.0.0.0", "192.168.1.69", "255.255.255.255", "10.0.0.1"] {
            assert!(validate_address(ok), "{ok}");
        }
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "",
            "   ",
            "1.2.3",
            "1.2.3.4.5",
            "256.1.1.1",
            "1.2.3.-4",
            "a.b.c.d",
            "1..2.3",
            "1.2.3.4 ",
        ] {
            assert!(!validate_address(bad), "{bad:?}");
        }
    }

    #[test]
    fn parse_returns_octets_or_zero() {
        assert_eq!(parse_address("8.8.4.4"), Ipv4Addr::new(8, 8, 4, 4));
        assert_eq!(parse_address("999.1.1.1"), Ipv4Addr::UNSPECIFIED);
        assert_eq!(parse_address(""), Ipv4Addr::UNSPECIFIED);
    }
}
