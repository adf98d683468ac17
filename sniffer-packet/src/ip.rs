//! IPv4 and IPv6 header parsing
//!
//! Parsing is zero-copy: the views borrow the captured frame. Payloads are
//! bounded by the length fields of the header so that link-layer padding
//! never leaks into the transport layer.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IP Protocol numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    /// IPv6 Hop-by-Hop options (0)
    HopByHop,
    /// ICMP (1)
    ICMP,
    /// IPv4 encapsulation (4)
    IPv4,
    /// TCP (6)
    TCP,
    /// UDP (17)
    UDP,
    /// IPv6 encapsulation (41)
    IPv6,
    /// IPv6 Routing header (43)
    Routing,
    /// IPv6 Fragment header (44)
    Fragment,
    /// GRE (47)
    GRE,
    /// ESP (50)
    ESP,
    /// AH (51)
    AH,
    /// ICMPv6 (58)
    ICMPv6,
    /// IPv6 No Next Header (59)
    NoNextHeader,
    /// IPv6 Destination options (60)
    DestinationOptions,
    /// Custom protocol number
    Custom(u8),
}

impl IpProtocol {
    pub fn to_u8(self) -> u8 {
        match self {
            IpProtocol::HopByHop => 0,
            IpProtocol::ICMP => 1,
            IpProtocol::IPv4 => 4,
            IpProtocol::TCP => 6,
            IpProtocol::UDP => 17,
            IpProtocol::IPv6 => 41,
            IpProtocol::Routing => 43,
            IpProtocol::Fragment => 44,
            IpProtocol::GRE => 47,
            IpProtocol::ESP => 50,
            IpProtocol::AH => 51,
            IpProtocol::ICMPv6 => 58,
            IpProtocol::NoNextHeader => 59,
            IpProtocol::DestinationOptions => 60,
            IpProtocol::Custom(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => IpProtocol::HopByHop,
            1 => IpProtocol::ICMP,
            4 => IpProtocol::IPv4,
            6 => IpProtocol::TCP,
            17 => IpProtocol::UDP,
            41 => IpProtocol::IPv6,
            43 => IpProtocol::Routing,
            44 => IpProtocol::Fragment,
            47 => IpProtocol::GRE,
            50 => IpProtocol::ESP,
            51 => IpProtocol::AH,
            58 => IpProtocol::ICMPv6,
            59 => IpProtocol::NoNextHeader,
            60 => IpProtocol::DestinationOptions,
            val => IpProtocol::Custom(val),
        }
    }
}

/// Borrowed IPv4 header
#[derive(Debug, Clone, Copy)]
pub struct Ipv4View<'a> {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub protocol: IpProtocol,
    /// Fragment offset in 8-byte units
    pub fragment_offset: u16,
    /// Bytes after the header, bounded by the total length field
    pub payload: &'a [u8],
}

impl<'a> Ipv4View<'a> {
    /// Minimum IPv4 header size (without options)
    pub const MIN_HEADER_SIZE: usize = 20;

    /// Parse an IPv4 header from bytes
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if data.len() < Self::MIN_HEADER_SIZE {
            return None;
        }

        let version = data[0] >> 4;
        let header_len = ((data[0] & 0x0F) as usize) * 4;
        if version != 4 || header_len < Self::MIN_HEADER_SIZE || data.len() < header_len {
            return None;
        }

        let total_length = u16::from_be_bytes([data[2], data[3]]) as usize;
        let fragment_offset = u16::from_be_bytes([data[6], data[7]]) & 0x1FFF;
        let protocol = IpProtocol::from_u8(data[9]);
        let source = Ipv4Addr::new(data[12], data[13], data[14], data[15]);
        let destination = Ipv4Addr::new(data[16], data[17], data[18], data[19]);

        // A zero total length shows up with TSO offload; trust the capture then
        let end = if total_length >= header_len {
            total_length.min(data.len())
        } else {
            data.len()
        };

        Some(Ipv4View {
            source,
            destination,
            protocol,
            fragment_offset,
            payload: &data[header_len..end],
        })
    }
}

/// Borrowed IPv6 header with extension headers already walked
#[derive(Debug, Clone, Copy)]
pub struct Ipv6View<'a> {
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
    /// Upper-layer protocol after the extension header chain
    pub protocol: IpProtocol,
    /// Fragment offset in 8-byte units, 0 when unfragmented
    pub fragment_offset: u16,
    /// Upper-layer bytes, bounded by the payload length field
    pub payload: &'a [u8],
}

impl<'a> Ipv6View<'a> {
    /// Fixed IPv6 header size
    pub const HEADER_SIZE: usize = 40;

    /// Limit on chained extension headers
    const MAX_EXTENSION_HEADERS: usize = 8;

    /// Parse an IPv6 header from bytes
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if data.len() < Self::HEADER_SIZE || data[0] >> 4 != 6 {
            return None;
        }

        let payload_length = u16::from_be_bytes([data[4], data[5]]) as usize;
        let source = Ipv6Addr::from(<[u8; 16]>::try_from(&data[8..24]).ok()?);
        let destination = Ipv6Addr::from(<[u8; 16]>::try_from(&data[24..40]).ok()?);

        // Jumbograms carry a zero payload length
        let end = if payload_length == 0 {
            data.len()
        } else {
            (Self::HEADER_SIZE + payload_length).min(data.len())
        };
        let mut payload = &data[Self::HEADER_SIZE..end];
        let mut protocol = IpProtocol::from_u8(data[6]);
        let mut fragment_offset = 0;

        for _ in 0..Self::MAX_EXTENSION_HEADERS {
            let ext_len = match protocol {
                IpProtocol::HopByHop | IpProtocol::Routing | IpProtocol::DestinationOptions => {
                    payload.get(1).map(|&len| (len as usize + 1) * 8)
                }
                IpProtocol::Fragment => payload.get(..8).map(|header| {
                    fragment_offset = u16::from_be_bytes([header[2], header[3]]) >> 3;
                    8
                }),
                IpProtocol::AH => payload.get(1).map(|&len| (len as usize + 2) * 4),
                _ => break,
            };

            match ext_len {
                Some(ext_len) if payload.len() >= ext_len => {
                    protocol = IpProtocol::from_u8(payload[0]);
                    payload = &payload[ext_len..];
                }
                // Extension chain cut short by the snapshot length
                _ => {
                    return Some(Ipv6View {
                        source,
                        destination,
                        protocol: IpProtocol::NoNextHeader,
                        fragment_offset,
                        payload: &[],
                    })
                }
            }
        }

        Some(Ipv6View {
            source,
            destination,
            protocol,
            fragment_offset,
            payload,
        })
    }
}

/// Either IP version
#[derive(Debug, Clone, Copy)]
pub enum IpView<'a> {
    V4(Ipv4View<'a>),
    V6(Ipv6View<'a>),
}

impl<'a> IpView<'a> {
    /// Parse an IP header, picking the version from the first nibble
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        match data.first()? >> 4 {
            4 => Ipv4View::parse(data).map(IpView::V4),
            6 => Ipv6View::parse(data).map(IpView::V6),
            _ => None,
        }
    }

    pub fn source(&self) -> IpAddr {
        match self {
            IpView::V4(ip) => IpAddr::V4(ip.source),
            IpView::V6(ip) => IpAddr::V6(ip.source),
        }
    }

    pub fn destination(&self) -> IpAddr {
        match self {
            IpView::V4(ip) => IpAddr::V4(ip.destination),
            IpView::V6(ip) => IpAddr::V6(ip.destination),
        }
    }

    pub fn protocol(&self) -> IpProtocol {
        match self {
            IpView::V4(ip) => ip.protocol,
            IpView::V6(ip) => ip.protocol,
        }
    }

    pub fn payload(&self) -> &'a [u8] {
        match self {
            IpView::V4(ip) => ip.payload,
            IpView::V6(ip) => ip.payload,
        }
    }

    /// True when the payload starts mid-datagram (no transport header)
    pub fn is_later_fragment(&self) -> bool {
        match self {
            IpView::V4(ip) => ip.fragment_offset != 0,
            IpView::V6(ip) => ip.fragment_offset != 0,
        }
    }
}
