//! Frame builder for synthesising captured traffic
//!
//! Used by tests and demos to produce byte-exact frames for the link types
//! the classifier understands.

use bytes::{BufMut, BytesMut};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::ethernet::{EtherType, MacAddress};
use crate::ip::{IpProtocol, Ipv4View, Ipv6View};
use crate::tcp::TcpView;
use crate::udp::UdpView;

/// Minimum Ethernet frame size (without FCS)
const MIN_ETHERNET_FRAME: usize = 60;

/// Link-layer framing
#[derive(Debug, Clone, Copy)]
enum Link {
    Ethernet,
    LinuxSll,
    Raw,
}

/// Network layer
#[derive(Debug, Clone, Copy)]
enum Network {
    Ipv4 { src: Ipv4Addr, dst: Ipv4Addr },
    Ipv6 { src: Ipv6Addr, dst: Ipv6Addr },
    Arp,
}

/// Transport layer
#[derive(Debug, Clone, Copy)]
enum Transport {
    Tcp { src_port: u16, dst_port: u16 },
    Udp { src_port: u16, dst_port: u16 },
    Raw(IpProtocol),
}

/// Fluent builder producing one frame
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use sniffer_packet::FrameBuilder;
///
/// let frame = FrameBuilder::ethernet()
///     .ipv4(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
///     .udp(5353, 53)
///     .payload(b"query".to_vec())
///     .build();
/// assert_eq!(frame.len(), 60);
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    link: Link,
    network: Option<Network>,
    transport: Option<Transport>,
    payload: Vec<u8>,
}

impl FrameBuilder {
    fn with_link(link: Link) -> Self {
        FrameBuilder {
            link,
            network: None,
            transport: None,
            payload: Vec::new(),
        }
    }

    /// Ethernet II framing (DLT_EN10MB)
    pub fn ethernet() -> Self {
        Self::with_link(Link::Ethernet)
    }

    /// Linux cooked capture framing (DLT_LINUX_SLL)
    pub fn linux_sll() -> Self {
        Self::with_link(Link::LinuxSll)
    }

    /// No link-layer header (LINKTYPE_RAW)
    pub fn raw() -> Self {
        Self::with_link(Link::Raw)
    }

    pub fn ipv4(mut self, src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        self.network = Some(Network::Ipv4 { src, dst });
        self
    }

    pub fn ipv6(mut self, src: Ipv6Addr, dst: Ipv6Addr) -> Self {
        self.network = Some(Network::Ipv6 { src, dst });
        self
    }

    /// ARP request body instead of an IP packet
    pub fn arp(mut self) -> Self {
        self.network = Some(Network::Arp);
        self
    }

    pub fn tcp(mut self, src_port: u16, dst_port: u16) -> Self {
        self.transport = Some(Transport::Tcp { src_port, dst_port });
        self
    }

    pub fn udp(mut self, src_port: u16, dst_port: u16) -> Self {
        self.transport = Some(Transport::Udp { src_port, dst_port });
        self
    }

    /// Carry the payload directly over IP with the given protocol number
    pub fn ip_protocol(mut self, protocol: IpProtocol) -> Self {
        self.transport = Some(Transport::Raw(protocol));
        self
    }

    pub fn payload(mut self, data: Vec<u8>) -> Self {
        self.payload = data;
        self
    }

    /// Assemble the frame, innermost layer first
    pub fn build(self) -> Vec<u8> {
        let (protocol, segment) = match self.transport {
            Some(Transport::Tcp { src_port, dst_port }) => {
                (IpProtocol::TCP, tcp_segment(src_port, dst_port, &self.payload))
            }
            Some(Transport::Udp { src_port, dst_port }) => {
                (IpProtocol::UDP, udp_datagram(src_port, dst_port, &self.payload))
            }
            Some(Transport::Raw(protocol)) => (protocol, self.payload.clone()),
            None => (IpProtocol::NoNextHeader, self.payload.clone()),
        };

        let (ethertype, packet) = match self.network {
            Some(Network::Ipv4 { src, dst }) => {
                (EtherType::IPv4, ipv4_packet(src, dst, protocol, &segment))
            }
            Some(Network::Ipv6 { src, dst }) => {
                (EtherType::IPv6, ipv6_packet(src, dst, protocol, &segment))
            }
            Some(Network::Arp) => (EtherType::ARP, arp_request()),
            None => (EtherType::Custom(0x88B5), segment),
        };

        match self.link {
            Link::Ethernet => ethernet_frame(ethertype, &packet),
            Link::LinuxSll => linux_sll_frame(ethertype, &packet),
            Link::Raw => packet,
        }
    }
}

fn tcp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(TcpView::MIN_HEADER_SIZE + payload.len());
    buffer.put_u16(src_port);
    buffer.put_u16(dst_port);
    buffer.put_u32(1); // sequence
    buffer.put_u32(0); // acknowledgment
    buffer.put_u8(5 << 4);
    buffer.put_u8(TcpView::PSH | TcpView::ACK);
    buffer.put_u16(65535); // window
    buffer.put_u16(0); // checksum
    buffer.put_u16(0); // urgent pointer
    buffer.put_slice(payload);
    buffer.to_vec()
}

fn udp_datagram(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(UdpView::HEADER_SIZE + payload.len());
    buffer.put_u16(src_port);
    buffer.put_u16(dst_port);
    buffer.put_u16((UdpView::HEADER_SIZE + payload.len()) as u16);
    buffer.put_u16(0); // checksum disabled
    buffer.put_slice(payload);
    buffer.to_vec()
}

fn ipv4_packet(src: Ipv4Addr, dst: Ipv4Addr, protocol: IpProtocol, payload: &[u8]) -> Vec<u8> {
    let total_length = (Ipv4View::MIN_HEADER_SIZE + payload.len()) as u16;

    let mut header = BytesMut::with_capacity(Ipv4View::MIN_HEADER_SIZE);
    header.put_u8(0x45);
    header.put_u8(0);
    header.put_u16(total_length);
    header.put_u16(0x1c46); // identification
    header.put_u16(0x4000); // don't fragment
    header.put_u8(64);
    header.put_u8(protocol.to_u8());
    header.put_u16(0);
    header.put_slice(&src.octets());
    header.put_slice(&dst.octets());

    let checksum = internet_checksum(&header);
    header[10..12].copy_from_slice(&checksum.to_be_bytes());

    header.put_slice(payload);
    header.to_vec()
}

fn ipv6_packet(src: Ipv6Addr, dst: Ipv6Addr, protocol: IpProtocol, payload: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(Ipv6View::HEADER_SIZE + payload.len());
    buffer.put_u32(0x6000_0000);
    buffer.put_u16(payload.len() as u16);
    buffer.put_u8(protocol.to_u8());
    buffer.put_u8(64);
    buffer.put_slice(&src.octets());
    buffer.put_slice(&dst.octets());
    buffer.put_slice(payload);
    buffer.to_vec()
}

fn arp_request() -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(28);
    buffer.put_u16(1); // Ethernet
    buffer.put_u16(EtherType::IPv4.to_u16());
    buffer.put_u8(6);
    buffer.put_u8(4);
    buffer.put_u16(1); // request
    buffer.put_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    buffer.put_slice(&[192, 168, 1, 1]);
    buffer.put_slice(MacAddress::ZERO.as_bytes());
    buffer.put_slice(&[192, 168, 1, 2]);
    buffer.to_vec()
}

fn ethernet_frame(ethertype: EtherType, payload: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(MIN_ETHERNET_FRAME.max(payload.len() + 14));
    buffer.put_slice(MacAddress::BROADCAST.as_bytes());
    buffer.put_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    buffer.put_u16(ethertype.to_u16());
    buffer.put_slice(payload);

    // Pad to minimum frame size, as a NIC would
    if buffer.len() < MIN_ETHERNET_FRAME {
        buffer.resize(MIN_ETHERNET_FRAME, 0);
    }
    buffer.to_vec()
}

fn linux_sll_frame(ethertype: EtherType, payload: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::with_capacity(16 + payload.len());
    buffer.put_u16(0); // packet sent to us
    buffer.put_u16(772); // ARPHRD_LOOPBACK
    buffer.put_u16(6);
    buffer.put_slice(&[0u8; 8]);
    buffer.put_u16(ethertype.to_u16());
    buffer.put_slice(payload);
    buffer.to_vec()
}

/// RFC 1071 Internet checksum
fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }
    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u32) << 8;
    }

    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !sum as u16
}
