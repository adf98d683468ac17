//! Encapsulation headers that carry a complete inner packet
//!
//! Each helper returns the inner network-layer bytes (IPv4 or IPv6) when
//! the tunnel header is well formed and carries IP.

use crate::ethernet::{EtherType, EthernetView};

/// IANA-assigned VXLAN UDP port
pub const VXLAN_PORT: u16 = 4789;

/// GRE protocol type for transparent Ethernet bridging
const GRE_PROTO_TEB: u16 = 0x6558;

const GRE_FLAG_CHECKSUM: u16 = 0x8000;
const GRE_FLAG_KEY: u16 = 0x2000;
const GRE_FLAG_SEQUENCE: u16 = 0x1000;
const GRE_VERSION_MASK: u16 = 0x0007;

/// VXLAN "I" flag: VNI field is valid
const VXLAN_FLAG_VNI: u8 = 0x08;

/// Inner IP packet of a GRE (version 0) payload
pub fn gre_inner(payload: &[u8]) -> Option<&[u8]> {
    let header = payload.get(..4)?;
    let flags = u16::from_be_bytes([header[0], header[1]]);
    let protocol = u16::from_be_bytes([header[2], header[3]]);

    if flags & GRE_VERSION_MASK != 0 {
        return None;
    }

    let mut offset = 4;
    for flag in [GRE_FLAG_CHECKSUM, GRE_FLAG_KEY, GRE_FLAG_SEQUENCE] {
        if flags & flag != 0 {
            offset += 4;
        }
    }
    let inner = payload.get(offset..)?;

    match protocol {
        GRE_PROTO_TEB => ethernet_ip(inner),
        other => match EtherType::from_u16(other) {
            EtherType::IPv4 | EtherType::IPv6 => Some(inner),
            _ => None,
        },
    }
}

/// Inner IP packet of a VXLAN payload
pub fn vxlan_inner(payload: &[u8]) -> Option<&[u8]> {
    let header = payload.get(..8)?;
    if header[0] & VXLAN_FLAG_VNI == 0 {
        return None;
    }
    ethernet_ip(&payload[8..])
}

fn ethernet_ip(frame: &[u8]) -> Option<&[u8]> {
    let view = EthernetView::parse(frame)?;
    match view.ethertype {
        EtherType::IPv4 | EtherType::IPv6 => Some(view.payload),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INNER: [u8; 3] = [0x45, 0x00, 0x00];

    #[test]
    fn test_gre_plain_ipv4() {
        let mut payload = vec![0x00, 0x00, 0x08, 0x00];
        payload.extend_from_slice(&INNER);
        assert_eq!(gre_inner(&payload), Some(&INNER[..]));
    }

    #[test]
    fn test_gre_optional_fields() {
        // Checksum + key present: 8 extra bytes
        let mut payload = vec![0xA0, 0x00, 0x86, 0xDD];
        payload.extend_from_slice(&[0u8; 8]);
        payload.extend_from_slice(&INNER);
        assert_eq!(gre_inner(&payload), Some(&INNER[..]));
    }

    #[test]
    fn test_gre_rejects_enhanced_and_non_ip() {
        let mut pptp = vec![0x30, 0x81, 0x88, 0x0B];
        pptp.extend_from_slice(&[0u8; 8]);
        assert!(gre_inner(&pptp).is_none());

        let arp = [0x00, 0x00, 0x08, 0x06, 0x00];
        assert!(gre_inner(&arp).is_none());
    }

    #[test]
    fn test_vxlan_inner_ethernet() {
        let mut payload = vec![0x08, 0, 0, 0, 0, 0, 0x2A, 0];
        payload.extend_from_slice(&[0xFF; 12]);
        payload.extend_from_slice(&[0x08, 0x00]);
        payload.extend_from_slice(&INNER);
        assert_eq!(vxlan_inner(&payload), Some(&INNER[..]));

        payload[0] = 0x00;
        assert!(vxlan_inner(&payload).is_none());
    }
}
