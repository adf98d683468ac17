//! BPF (Berkeley Packet Filter) capture filter handling
//!
//! Filter expressions are handed to libpcap unchanged. This module only
//! decides whether an expression is present at all and checks that it
//! compiles before a device is opened.

use pcap::{Capture, Linktype};
use sniffer_core::{Error, Result};
use sniffer_packet::LinkType;
use tracing::debug;

/// Trim a user supplied expression; blank means "match all"
pub fn normalize(expr: &str) -> Option<String> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Compile an expression against a link type without touching a device.
///
/// Lets a bad filter be reported as [`Error::InvalidFilter`] before the
/// interface is opened. A blank expression is always valid.
pub fn validate(expr: &str, link: LinkType) -> Result<()> {
    let Some(filter) = normalize(expr) else {
        return Ok(());
    };

    let dead = Capture::dead(Linktype(link.dlt()))
        .map_err(|e| Error::capture(format!("cannot create filter compiler: {}", e)))?;

    dead.compile(&filter, true).map_err(|e| Error::InvalidFilter {
        filter: filter.clone(),
        reason: e.to_string(),
    })?;

    debug!(filter = %filter, link = %link, "capture filter compiles");
    Ok(())
}

/// Link types tried by [`check_syntax`]: wired, cooked, raw IP and 802.11
/// (plain and radiotap)
const SYNTAX_CHECK_LINKS: [LinkType; 5] = [
    LinkType::Ethernet,
    LinkType::LinuxSll,
    LinkType::Raw,
    LinkType::Other(105),
    LinkType::Other(127),
];

/// Check an expression before the device's link type is known.
///
/// Accepts the expression if it compiles on any common link type, so a
/// primitive that only makes sense on the real link (`type mgt` on a
/// monitor-mode interface) is left for the open to decide. Fails with the
/// Ethernet compile error when nothing accepts it.
pub fn check_syntax(expr: &str) -> Result<()> {
    let mut first_error = None;
    for link in SYNTAX_CHECK_LINKS {
        match validate(expr, link) {
            Ok(()) => return Ok(()),
            Err(e @ Error::InvalidFilter { .. }) => {
                first_error.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   \t"), None);
        assert_eq!(normalize(" udp port 53 "), Some("udp port 53".to_string()));
    }

    #[test]
    fn test_blank_filter_is_valid() {
        assert!(validate("", LinkType::Ethernet).is_ok());
        assert!(validate("  ", LinkType::Other(9999)).is_ok());
    }

    #[test]
    fn test_valid_filters() {
        for expr in ["udp", "tcp port 80", "host 10.0.0.1 and not icmp", "ip6"] {
            assert!(validate(expr, LinkType::Ethernet).is_ok(), "{}", expr);
        }
    }

    #[test]
    fn test_invalid_filter() {
        match validate("tcp prot 80 !!!", LinkType::Ethernet) {
            Err(Error::InvalidFilter { filter, reason }) => {
                assert_eq!(filter, "tcp prot 80 !!!");
                assert!(!reason.is_empty());
            }
            other => panic!("Expected InvalidFilter, got {:?}", other),
        }
    }

    #[test]
    fn test_link_specific_primitive() {
        // Ethernet address primitives are meaningless on raw IP captures
        assert!(validate("ether host ff:ff:ff:ff:ff:ff", LinkType::Ethernet).is_ok());
        assert!(validate("ether host ff:ff:ff:ff:ff:ff", LinkType::Raw).is_err());
    }

    #[test]
    fn test_syntax_check_accepts_link_specific_primitives() {
        // 802.11 frame types only compile on wireless links
        assert!(validate("type mgt", LinkType::Ethernet).is_err());
        assert!(validate("type mgt", LinkType::Other(127)).is_ok());
        assert!(check_syntax("type mgt").is_ok());
        assert!(check_syntax("ether host ff:ff:ff:ff:ff:ff").is_ok());
        assert!(check_syntax("").is_ok());
    }

    #[test]
    fn test_syntax_check_rejects_malformed_expression() {
        match check_syntax("udp prot 53") {
            Err(Error::InvalidFilter { filter, .. }) => assert_eq!(filter, "udp prot 53"),
            other => panic!("Expected InvalidFilter, got {:?}", other),
        }
    }
}
