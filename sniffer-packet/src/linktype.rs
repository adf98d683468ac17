//! Link-layer types and decapsulation down to the network layer

use crate::ethernet::{EtherType, EthernetView};
use std::fmt;

/// Link-layer header types a capture may report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// BSD loopback, host-order address family (DLT_NULL, 0)
    Null,
    /// Ethernet II (DLT_EN10MB, 1)
    Ethernet,
    /// Raw IP (LINKTYPE_RAW 101, or DLT_RAW 12/14 on some platforms)
    Raw,
    /// OpenBSD loopback, network-order address family (DLT_LOOP, 108)
    Loop,
    /// Linux cooked capture v1 (DLT_LINUX_SLL, 113)
    LinuxSll,
    /// Raw IPv4 (DLT_IPV4, 228)
    Ipv4,
    /// Raw IPv6 (DLT_IPV6, 229)
    Ipv6,
    /// Linux cooked capture v2 (DLT_LINUX_SLL2, 276)
    LinuxSll2,
    /// Any other link type; packets are recorded but never summarized
    Other(i32),
}

impl LinkType {
    /// Map a pcap DLT number to a link type
    pub fn from_dlt(dlt: i32) -> Self {
        match dlt {
            0 => LinkType::Null,
            1 => LinkType::Ethernet,
            12 | 14 | 101 => LinkType::Raw,
            108 => LinkType::Loop,
            113 => LinkType::LinuxSll,
            228 => LinkType::Ipv4,
            229 => LinkType::Ipv6,
            276 => LinkType::LinuxSll2,
            other => LinkType::Other(other),
        }
    }

    /// DLT number to use when writing a capture file
    pub fn dlt(self) -> i32 {
        match self {
            LinkType::Null => 0,
            LinkType::Ethernet => 1,
            LinkType::Raw => 101,
            LinkType::Loop => 108,
            LinkType::LinuxSll => 113,
            LinkType::Ipv4 => 228,
            LinkType::Ipv6 => 229,
            LinkType::LinuxSll2 => 276,
            LinkType::Other(dlt) => dlt,
        }
    }

    /// Strip the link-layer header.
    ///
    /// Returns the bytes of the network-layer packet when the frame carries
    /// IPv4 or IPv6, `None` otherwise (ARP, LLC, unknown link types, ...).
    pub fn ip_payload(self, frame: &[u8]) -> Option<&[u8]> {
        match self {
            LinkType::Ethernet => {
                let view = EthernetView::parse(frame)?;
                match view.ethertype {
                    EtherType::IPv4 | EtherType::IPv6 => Some(view.payload),
                    _ => None,
                }
            }
            LinkType::Raw | LinkType::Ipv4 | LinkType::Ipv6 => Some(frame),
            LinkType::Null => {
                let family = frame.get(..4)?;
                let host = u32::from_ne_bytes([family[0], family[1], family[2], family[3]]);
                // Captures moved between hosts may carry the other byte order
                let swapped = host.swap_bytes();
                if is_ip_family(host) || is_ip_family(swapped) {
                    Some(&frame[4..])
                } else {
                    None
                }
            }
            LinkType::Loop => {
                let family = frame.get(..4)?;
                let family = u32::from_be_bytes([family[0], family[1], family[2], family[3]]);
                is_ip_family(family).then(|| &frame[4..])
            }
            LinkType::LinuxSll => {
                let header = frame.get(..16)?;
                is_ip_ethertype(u16::from_be_bytes([header[14], header[15]]))
                    .then(|| &frame[16..])
            }
            LinkType::LinuxSll2 => {
                let header = frame.get(..20)?;
                is_ip_ethertype(u16::from_be_bytes([header[0], header[1]])).then(|| &frame[20..])
            }
            LinkType::Other(_) => None,
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Null => write!(f, "NULL"),
            LinkType::Ethernet => write!(f, "EN10MB"),
            LinkType::Raw => write!(f, "RAW"),
            LinkType::Loop => write!(f, "LOOP"),
            LinkType::LinuxSll => write!(f, "LINUX_SLL"),
            LinkType::Ipv4 => write!(f, "IPV4"),
            LinkType::Ipv6 => write!(f, "IPV6"),
            LinkType::LinuxSll2 => write!(f, "LINUX_SLL2"),
            LinkType::Other(dlt) => write!(f, "DLT {}", dlt),
        }
    }
}

fn is_ip_ethertype(value: u16) -> bool {
    matches!(
        EtherType::from_u16(value),
        EtherType::IPv4 | EtherType::IPv6
    )
}

/// AF_INET is 2 everywhere; AF_INET6 differs per OS (Linux 10, BSDs 24/28/30)
fn is_ip_family(family: u32) -> bool {
    matches!(family, 2 | 10 | 24 | 28 | 30)
}
