//! Ethernet II frame parsing
//!
//! Captured Ethernet frames are walked past any 802.1Q / 802.1ad tags and
//! PPPoE session headers until the network-layer protocol is reached.

use std::fmt;

/// EtherType values the decoder cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// VLAN-tagged frame (0x8100)
    VLAN,
    /// IPv6 (0x86DD)
    IPv6,
    /// PPPoE Session (0x8864)
    PPPoESession,
    /// Q-in-Q/802.1ad (0x88A8)
    QinQ,
    /// Legacy Q-in-Q (0x9100)
    QinQLegacy,
    /// 802.3 length field instead of an EtherType
    LLC,
    /// Custom EtherType
    Custom(u16),
}

impl EtherType {
    /// Convert EtherType to u16 value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => 0x0800,
            EtherType::ARP => 0x0806,
            EtherType::VLAN => 0x8100,
            EtherType::IPv6 => 0x86DD,
            EtherType::PPPoESession => 0x8864,
            EtherType::QinQ => 0x88A8,
            EtherType::QinQLegacy => 0x9100,
            EtherType::LLC => 0,
            EtherType::Custom(val) => val,
        }
    }

    /// Create EtherType from u16 value
    pub fn from_u16(value: u16) -> Self {
        match value {
            0..=1500 => EtherType::LLC,
            0x0800 => EtherType::IPv4,
            0x0806 => EtherType::ARP,
            0x8100 => EtherType::VLAN,
            0x86DD => EtherType::IPv6,
            0x8864 => EtherType::PPPoESession,
            0x88A8 => EtherType::QinQ,
            0x9100 => EtherType::QinQLegacy,
            val => EtherType::Custom(val),
        }
    }

    /// True for the tag types that wrap another EtherType
    pub fn is_vlan_tag(self) -> bool {
        matches!(
            self,
            EtherType::VLAN | EtherType::QinQ | EtherType::QinQLegacy
        )
    }
}

/// MAC address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Broadcast MAC address (FF:FF:FF:FF:FF:FF)
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);

    /// Zero MAC address (00:00:00:00:00:00)
    pub const ZERO: MacAddress = MacAddress([0x00; 6]);

    /// Create a MAC address from a slice
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = slice.try_into().ok()?;
        Some(MacAddress(bytes))
    }

    /// Get the MAC address as a byte array
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// PPP protocol numbers carried inside PPPoE session frames
const PPP_IPV4: u16 = 0x0021;
const PPP_IPV6: u16 = 0x0057;

/// Decoded Ethernet header with the network-layer payload located
#[derive(Debug, Clone, Copy)]
pub struct EthernetView<'a> {
    /// Destination MAC address
    pub destination: MacAddress,
    /// Source MAC address
    pub source: MacAddress,
    /// Innermost EtherType after tags and PPPoE were removed
    pub ethertype: EtherType,
    /// Number of VLAN tags skipped
    pub vlan_tags: usize,
    /// Bytes following the last link-layer header
    pub payload: &'a [u8],
}

impl<'a> EthernetView<'a> {
    /// Ethernet header size (dst + src + type/length)
    pub const HEADER_SIZE: usize = 14;

    /// VLAN tag size (TPID is already counted as the EtherType)
    pub const VLAN_TAG_SIZE: usize = 4;

    /// PPPoE session header plus the PPP protocol field
    pub const PPPOE_HEADER_SIZE: usize = 8;

    /// Parse an Ethernet frame from bytes
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if data.len() < Self::HEADER_SIZE {
            return None;
        }

        let destination = MacAddress::from_slice(&data[0..6])?;
        let source = MacAddress::from_slice(&data[6..12])?;

        let mut ethertype = EtherType::from_u16(u16::from_be_bytes([data[12], data[13]]));
        let mut offset = Self::HEADER_SIZE;
        let mut vlan_tags = 0;

        while ethertype.is_vlan_tag() {
            let tag = data.get(offset..offset + Self::VLAN_TAG_SIZE)?;
            ethertype = EtherType::from_u16(u16::from_be_bytes([tag[2], tag[3]]));
            offset += Self::VLAN_TAG_SIZE;
            vlan_tags += 1;
        }

        if ethertype == EtherType::PPPoESession {
            let pppoe = data.get(offset..offset + Self::PPPOE_HEADER_SIZE)?;
            ethertype = match u16::from_be_bytes([pppoe[6], pppoe[7]]) {
                PPP_IPV4 => EtherType::IPv4,
                PPP_IPV6 => EtherType::IPv6,
                other => EtherType::Custom(other),
            };
            offset += Self::PPPOE_HEADER_SIZE;
        }

        Some(EthernetView {
            destination,
            source,
            ethertype,
            vlan_tags,
            payload: &data[offset..],
        })
    }
}
