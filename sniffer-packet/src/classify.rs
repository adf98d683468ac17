//! Packet classification
//!
//! Turns a captured frame into a [`PacketSummary`]: outermost IP addresses,
//! a TCP/UDP/OTHER tag and an optional payload preview.
//!
//! Transport headers are searched the way a full dissector stacks layers:
//! a UDP tunnel (VXLAN) or an IP/GRE tunnel is descended into, so a single
//! frame can show both TCP and UDP headers. When that happens TCP wins.

use sniffer_core::{CaptureSession, PacketSummary, PayloadPreview, RawPacket, TransportProtocol};

use crate::ip::{IpProtocol, IpView};
use crate::linktype::LinkType;
use crate::tcp::TcpView;
use crate::tunnel::{self, VXLAN_PORT};
use crate::udp::UdpView;

/// Nesting limit for tunnels within tunnels
const MAX_ENCAPSULATION_DEPTH: usize = 4;

/// Stateless classifier bound to one capture's link type and preview setting
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    link_type: LinkType,
    payload_preview: bool,
}

impl Classifier {
    pub fn new(link_type: LinkType, payload_preview: bool) -> Self {
        Self {
            link_type,
            payload_preview,
        }
    }

    /// Classifier configured from a session
    pub fn for_session(session: &CaptureSession, link_type: LinkType) -> Self {
        Self::new(link_type, session.payload_preview())
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Classify one packet.
    ///
    /// Returns `None` when the frame has no IP header. Malformed transport
    /// headers never fail classification; they just downgrade the tag to
    /// [`TransportProtocol::Other`].
    pub fn classify(&self, packet: &RawPacket) -> Option<PacketSummary> {
        let network = self.link_type.ip_payload(packet.data())?;
        let ip = IpView::parse(network)?;

        let mut evidence = TransportEvidence::default();
        evidence.collect(&ip, 0);

        let (protocol, transport_payload) = evidence.resolve();
        let preview = if self.payload_preview {
            transport_payload.and_then(PayloadPreview::from_payload)
        } else {
            None
        };

        Some(PacketSummary {
            timestamp: packet.timestamp,
            source: ip.source(),
            destination: ip.destination(),
            protocol,
            preview,
        })
    }
}

/// Outermost TCP and UDP headers found anywhere in the layer stack
#[derive(Debug, Default)]
struct TransportEvidence<'a> {
    tcp: Option<TcpView<'a>>,
    udp: Option<UdpView<'a>>,
}

impl<'a> TransportEvidence<'a> {
    fn collect(&mut self, ip: &IpView<'a>, depth: usize) {
        if ip.is_later_fragment() {
            return;
        }

        let payload = ip.payload();
        let inner = match ip.protocol() {
            IpProtocol::TCP => {
                if let Some(tcp) = TcpView::parse(payload) {
                    self.tcp.get_or_insert(tcp);
                }
                None
            }
            IpProtocol::UDP => match UdpView::parse(payload) {
                Some(udp) => {
                    self.udp.get_or_insert(udp);
                    if udp.uses_port(VXLAN_PORT) {
                        tunnel::vxlan_inner(udp.payload)
                    } else {
                        None
                    }
                }
                None => None,
            },
            IpProtocol::IPv4 | IpProtocol::IPv6 => Some(payload),
            IpProtocol::GRE => tunnel::gre_inner(payload),
            _ => None,
        };

        if depth + 1 >= MAX_ENCAPSULATION_DEPTH {
            return;
        }
        if let Some(inner_ip) = inner.and_then(IpView::parse) {
            self.collect(&inner_ip, depth + 1);
        }
    }

    /// Tag and the payload of the transport the tag refers to
    fn resolve(&self) -> (TransportProtocol, Option<&'a [u8]>) {
        if let Some(tcp) = &self.tcp {
            (TransportProtocol::Tcp, Some(tcp.payload))
        } else if let Some(udp) = &self.udp {
            (TransportProtocol::Udp, Some(udp.payload))
        } else {
            (TransportProtocol::Other, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FrameBuilder;
    use sniffer_core::MAX_PREVIEW_LEN;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn v4(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
        Ipv4Addr::new(a, b, c, d)
    }

    fn classify(link: LinkType, preview: bool, frame: Vec<u8>) -> Option<PacketSummary> {
        Classifier::new(link, preview).classify(&RawPacket::new(frame))
    }

    #[test]
    fn test_tcp_packet() {
        let frame = FrameBuilder::ethernet()
            .ipv4(v4(10, 0, 0, 1), v4(10, 0, 0, 2))
            .tcp(40000, 443)
            .payload(b"hello".to_vec())
            .build();

        let summary = classify(LinkType::Ethernet, false, frame).unwrap();
        assert_eq!(summary.source, IpAddr::V4(v4(10, 0, 0, 1)));
        assert_eq!(summary.destination, IpAddr::V4(v4(10, 0, 0, 2)));
        assert_eq!(summary.protocol, TransportProtocol::Tcp);
        assert!(summary.preview.is_none());
    }

    #[test]
    fn test_udp_packet_with_preview() {
        let frame = FrameBuilder::ethernet()
            .ipv4(v4(192, 168, 1, 10), v4(8, 8, 8, 8))
            .udp(5353, 53)
            .payload(b"query".to_vec())
            .build();

        let summary = classify(LinkType::Ethernet, true, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Udp);
        assert_eq!(summary.preview.unwrap().as_bytes(), b"query");
    }

    #[test]
    fn test_other_ip_protocol() {
        let frame = FrameBuilder::ethernet()
            .ipv4(v4(10, 0, 0, 1), v4(10, 0, 0, 2))
            .ip_protocol(IpProtocol::ICMP)
            .payload(vec![8, 0, 0xF7, 0xFF, 0, 0, 0, 0])
            .build();

        let summary = classify(LinkType::Ethernet, true, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Other);
        assert!(summary.preview.is_none());
    }

    #[test]
    fn test_non_ip_frame_has_no_summary() {
        let arp = FrameBuilder::ethernet().arp().build();
        assert!(classify(LinkType::Ethernet, true, arp).is_none());

        assert!(classify(LinkType::Ethernet, true, vec![0u8; 10]).is_none());
        assert!(classify(LinkType::Other(147), true, vec![0x45; 64]).is_none());
    }

    #[test]
    fn test_truncated_transport_is_other() {
        let mut frame = FrameBuilder::ethernet()
            .ipv4(v4(10, 0, 0, 1), v4(10, 0, 0, 2))
            .tcp(1234, 80)
            .build();
        // Keep Ethernet + IPv4 + 10 bytes of the TCP header
        frame.truncate(14 + 20 + 10);

        let summary = classify(LinkType::Ethernet, true, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Other);
        assert!(summary.preview.is_none());
    }

    #[test]
    fn test_preview_is_bounded() {
        let frame = FrameBuilder::ethernet()
            .ipv4(v4(10, 0, 0, 1), v4(10, 0, 0, 2))
            .tcp(1234, 80)
            .payload(vec![b'A'; 500])
            .build();

        let preview = classify(LinkType::Ethernet, true, frame)
            .unwrap()
            .preview
            .unwrap();
        assert_eq!(preview.len(), MAX_PREVIEW_LEN);
    }

    #[test]
    fn test_empty_payload_has_no_preview() {
        let frame = FrameBuilder::ethernet()
            .ipv4(v4(10, 0, 0, 1), v4(10, 0, 0, 2))
            .tcp(1234, 80)
            .build();

        // Builder pads to the Ethernet minimum; padding is not payload
        assert_eq!(frame.len(), 60);
        let summary = classify(LinkType::Ethernet, true, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Tcp);
        assert!(summary.preview.is_none());
    }

    #[test]
    fn test_tcp_wins_over_udp() {
        let inner = FrameBuilder::ethernet()
            .ipv4(v4(172, 16, 0, 1), v4(172, 16, 0, 2))
            .tcp(5000, 22)
            .payload(b"SSH-2.0".to_vec())
            .build();
        let mut vxlan = vec![0x08, 0, 0, 0, 0, 0, 0x01, 0];
        vxlan.extend_from_slice(&inner);

        let frame = FrameBuilder::ethernet()
            .ipv4(v4(10, 0, 0, 1), v4(10, 0, 0, 2))
            .udp(49152, VXLAN_PORT)
            .payload(vxlan)
            .build();

        let summary = classify(LinkType::Ethernet, true, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Tcp);
        // Addresses come from the outer header, the preview from TCP
        assert_eq!(summary.source, IpAddr::V4(v4(10, 0, 0, 1)));
        assert_eq!(summary.preview.unwrap().as_bytes(), b"SSH-2.0");
    }

    #[test]
    fn test_ip_in_ip_tunnel() {
        let inner = FrameBuilder::raw()
            .ipv4(v4(192, 168, 0, 1), v4(192, 168, 0, 2))
            .udp(1000, 2000)
            .build();

        let frame = FrameBuilder::raw()
            .ipv4(v4(203, 0, 113, 1), v4(203, 0, 113, 2))
            .ip_protocol(IpProtocol::IPv4)
            .payload(inner)
            .build();

        let summary = classify(LinkType::Raw, false, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Udp);
        assert_eq!(summary.source, IpAddr::V4(v4(203, 0, 113, 1)));
    }

    #[test]
    fn test_gre_tunnel() {
        let inner = FrameBuilder::raw()
            .ipv4(v4(192, 168, 0, 1), v4(192, 168, 0, 2))
            .tcp(1000, 80)
            .build();
        let mut gre = vec![0x00, 0x00, 0x08, 0x00];
        gre.extend_from_slice(&inner);

        let frame = FrameBuilder::raw()
            .ipv4(v4(198, 51, 100, 1), v4(198, 51, 100, 2))
            .ip_protocol(IpProtocol::GRE)
            .payload(gre)
            .build();

        let summary = classify(LinkType::Raw, false, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Tcp);
    }

    #[test]
    fn test_ipv6_packet() {
        let src: Ipv6Addr = "fe80::1".parse().unwrap();
        let dst: Ipv6Addr = "ff02::fb".parse().unwrap();
        let frame = FrameBuilder::ethernet()
            .ipv6(src, dst)
            .udp(5353, 5353)
            .payload(vec![0u8; 12])
            .build();

        let summary = classify(LinkType::Ethernet, false, frame).unwrap();
        assert_eq!(summary.source, IpAddr::V6(src));
        assert_eq!(summary.destination, IpAddr::V6(dst));
        assert_eq!(summary.protocol, TransportProtocol::Udp);
    }

    #[test]
    fn test_ipv6_truncated_extension_header_is_other() {
        let src: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let dst: Ipv6Addr = "2001:db8::2".parse().unwrap();

        let hop_by_hop = FrameBuilder::raw()
            .ipv6(src, dst)
            .ip_protocol(IpProtocol::HopByHop)
            .build();
        let summary = classify(LinkType::Raw, true, hop_by_hop).unwrap();
        assert_eq!(summary.source, IpAddr::V6(src));
        assert_eq!(summary.protocol, TransportProtocol::Other);
        assert!(summary.preview.is_none());

        let fragment = FrameBuilder::raw()
            .ipv6(src, dst)
            .ip_protocol(IpProtocol::Fragment)
            .payload(vec![6, 0, 0])
            .build();
        let summary = classify(LinkType::Raw, false, fragment).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Other);
    }

    #[test]
    fn test_linux_cooked_capture() {
        let frame = FrameBuilder::linux_sll()
            .ipv4(v4(127, 0, 0, 1), v4(127, 0, 0, 1))
            .tcp(8080, 50000)
            .build();

        let summary = classify(LinkType::LinuxSll, false, frame).unwrap();
        assert_eq!(summary.protocol, TransportProtocol::Tcp);
    }

    #[test]
    fn test_summary_keeps_packet_timestamp() {
        let frame = FrameBuilder::raw()
            .ipv4(v4(10, 0, 0, 1), v4(10, 0, 0, 2))
            .udp(1, 2)
            .build();
        let packet = RawPacket::new(frame);

        let summary = Classifier::new(LinkType::Raw, false)
            .classify(&packet)
            .unwrap();
        assert_eq!(summary.timestamp, packet.timestamp);
    }

    #[test]
    fn test_for_session() {
        let session = CaptureSession::new("eth0")
            .unwrap()
            .with_payload_preview(true);
        let classifier = Classifier::for_session(&session, LinkType::Ethernet);

        assert!(classifier.payload_preview);
        assert_eq!(classifier.link_type(), LinkType::Ethernet);
    }
}
