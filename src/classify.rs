//! IP address scope classification
//!
//! Maps an IP address string onto a single network-scope category
//! (Public, Private, Loopback, etc.). Classification is total: any
//! string that parses as IPv4 or IPv6 gets exactly one category, and
//! strings that do not parse are downgraded to `Unspecified` with a
//! warning rather than an error.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use tracing::warn;

/// Errors from address classification
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// No address string was supplied
    #[error("an IP address value must be specified")]
    MissingAddress,
}

/// Network-scope category of an IP address.
///
/// An address can satisfy several scope predicates at once; the
/// classifier evaluates them in a fixed priority order (multicast,
/// public, loopback, link-local, unspecified, private, reserved) so
/// exactly one category is ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpCategory {
    /// Multicast range (224.0.0.0/4, ff00::/8)
    Multicast,
    /// Globally routable address
    Public,
    /// Loopback address (127.0.0.0/8, ::1)
    Loopback,
    /// Link-local address (169.254.0.0/16, fe80::/10)
    LinkLocal,
    /// All-zeros placeholder, unparseable input, or no other scope matched
    Unspecified,
    /// Private-use range (RFC 1918, fc00::/7)
    Private,
    /// Reserved for future use (240.0.0.0/4)
    Reserved,
}

impl std::fmt::Display for IpCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpCategory::Multicast => write!(f, "Multicast"),
            IpCategory::Public => write!(f, "Public"),
            IpCategory::Loopback => write!(f, "Loopback"),
            IpCategory::LinkLocal => write!(f, "Link Local"),
            IpCategory::Unspecified => write!(f, "Unspecified"),
            IpCategory::Private => write!(f, "Private"),
            IpCategory::Reserved => write!(f, "Reserved"),
        }
    }
}

/// Classify an IP address string into its scope category.
///
/// Returns an error only for an empty input string. A string that is
/// not valid IPv4/IPv6 logs a warning and classifies as
/// [`IpCategory::Unspecified`].
pub fn classify(ip_str: &str) -> Result<IpCategory, ClassifyError> {
    if ip_str.trim().is_empty() {
        return Err(ClassifyError::MissingAddress);
    }
    match ip_str.trim().parse::<IpAddr>() {
        Ok(addr) => Ok(classify_addr(addr)),
        Err(_) => {
            warn!("{ip_str} does not appear to be an IPv4 or IPv6 address");
            Ok(IpCategory::Unspecified)
        }
    }
}

/// Classify a parsed IP address. Total over all addresses.
pub fn classify_addr(addr: IpAddr) -> IpCategory {
    if is_multicast(&addr) {
        IpCategory::Multicast
    } else if is_global(&addr) {
        IpCategory::Public
    } else if addr.is_loopback() {
        IpCategory::Loopback
    } else if is_link_local(&addr) {
        IpCategory::LinkLocal
    } else if addr.is_unspecified() {
        IpCategory::Unspecified
    } else if is_private(&addr) {
        IpCategory::Private
    } else if is_reserved(&addr) {
        IpCategory::Reserved
    } else {
        // CGNAT, benchmarking and other special-use ranges land here
        IpCategory::Unspecified
    }
}

fn is_multicast(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_multicast(),
        IpAddr::V6(v6) => v6.is_multicast(),
    }
}

fn is_link_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => is_unicast_link_local_v6(v6),
    }
}

fn is_private(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => is_unique_local_v6(v6),
    }
}

fn is_reserved(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_reserved_v4(v4),
        IpAddr::V6(_) => false,
    }
}

fn is_global(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_global_v4(v4),
        IpAddr::V6(v6) => is_global_v6(v6),
    }
}

/// Checks if an IPv4 address is in the CGNAT range (100.64.0.0/10).
fn is_cgnat(ip: &Ipv4Addr) -> bool {
    let octets = ip.octets();
    octets[0] == 100 && (64..=127).contains(&octets[1])
}

/// Checks if an IPv4 address is in the benchmarking range (198.18.0.0/15).
fn is_benchmarking(ip: &Ipv4Addr) -> bool {
    let octets = ip.octets();
    octets[0] == 198 && (octets[1] == 18 || octets[1] == 19)
}

/// Reserved for future use: 240.0.0.0/4 minus the broadcast address.
fn is_reserved_v4(ip: &Ipv4Addr) -> bool {
    ip.octets()[0] >= 240 && !ip.is_broadcast()
}

fn is_global_v4(ip: &Ipv4Addr) -> bool {
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        || is_cgnat(ip)
        || is_benchmarking(ip)
        || is_reserved_v4(ip))
}

/// fe80::/10
fn is_unicast_link_local_v6(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

/// fc00::/7
fn is_unique_local_v6(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}

/// 2001:db8::/32
fn is_documentation_v6(ip: &Ipv6Addr) -> bool {
    let segments = ip.segments();
    segments[0] == 0x2001 && segments[1] == 0xdb8
}

fn is_global_v6(ip: &Ipv6Addr) -> bool {
    !(ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || is_unicast_link_local_v6(ip)
        || is_unique_local_v6(ip)
        || is_documentation_v6(ip)
        // ::/96 covers IPv4-compatible and other legacy mappings
        || ip.segments()[0] == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_addresses() {
        assert_eq!(classify("8.8.8.8").unwrap(), IpCategory::Public);
        assert_eq!(classify("1.1.1.1").unwrap(), IpCategory::Public);
        assert_eq!(
            classify("2001:4860:4860::8888").unwrap(),
            IpCategory::Public
        );
    }

    #[test]
    fn test_private_addresses() {
        assert_eq!(classify("10.0.0.5").unwrap(), IpCategory::Private);
        assert_eq!(classify("192.168.1.1").unwrap(), IpCategory::Private);
        assert_eq!(classify("172.16.0.1").unwrap(), IpCategory::Private);
        assert_eq!(classify("fc00::1").unwrap(), IpCategory::Private);
        // Just outside the private range
        assert_eq!(classify("172.32.0.1").unwrap(), IpCategory::Public);
    }

    #[test]
    fn test_loopback() {
        assert_eq!(classify("127.0.0.1").unwrap(), IpCategory::Loopback);
        assert_eq!(classify("127.255.255.255").unwrap(), IpCategory::Loopback);
        assert_eq!(classify("::1").unwrap(), IpCategory::Loopback);
    }

    #[test]
    fn test_link_local() {
        assert_eq!(classify("169.254.1.1").unwrap(), IpCategory::LinkLocal);
        assert_eq!(classify("fe80::1").unwrap(), IpCategory::LinkLocal);
    }

    #[test]
    fn test_multicast() {
        assert_eq!(classify("224.0.0.1").unwrap(), IpCategory::Multicast);
        assert_eq!(classify("239.255.255.255").unwrap(), IpCategory::Multicast);
        assert_eq!(classify("ff02::1").unwrap(), IpCategory::Multicast);
    }

    #[test]
    fn test_unspecified() {
        assert_eq!(classify("0.0.0.0").unwrap(), IpCategory::Unspecified);
        assert_eq!(classify("::").unwrap(), IpCategory::Unspecified);
    }

    #[test]
    fn test_reserved() {
        assert_eq!(classify("240.0.0.1").unwrap(), IpCategory::Reserved);
        // Broadcast is special-use, not reserved
        assert_ne!(classify("255.255.255.255").unwrap(), IpCategory::Reserved);
    }

    #[test]
    fn test_cgnat_falls_through_to_unspecified() {
        // 100.64.0.0/10 is neither global nor private
        assert_eq!(classify("100.64.0.1").unwrap(), IpCategory::Unspecified);
        assert_eq!(
            classify("100.127.255.255").unwrap(),
            IpCategory::Unspecified
        );
        // Just outside CGNAT
        assert_eq!(classify("100.63.255.255").unwrap(), IpCategory::Public);
        assert_eq!(classify("100.128.0.0").unwrap(), IpCategory::Public);
    }

    #[test]
    fn test_invalid_input_is_unspecified() {
        assert_eq!(classify("not-an-ip").unwrap(), IpCategory::Unspecified);
        assert_eq!(classify("300.1.2.3").unwrap(), IpCategory::Unspecified);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(classify(""), Err(ClassifyError::MissingAddress)));
        assert!(matches!(
            classify("   "),
            Err(ClassifyError::MissingAddress)
        ));
    }

    #[test]
    fn test_deterministic() {
        for ip in ["8.8.8.8", "10.0.0.5", "224.0.0.1", "not-an-ip"] {
            assert_eq!(classify(ip).unwrap(), classify(ip).unwrap());
        }
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(IpCategory::Public.to_string(), "Public");
        assert_eq!(IpCategory::LinkLocal.to_string(), "Link Local");
        assert_eq!(IpCategory::Private.to_string(), "Private");
    }
}
