//! Header parsing and protocol classification for captured frames
//!
//! This crate turns the raw bytes delivered by a capture source into a
//! [`PacketSummary`](sniffer_core::PacketSummary). It understands:
//!
//! - **Link layers**: Ethernet II (802.1Q/802.1ad tags, PPPoE sessions),
//!   Linux cooked v1/v2, raw IP, BSD null/loopback
//! - **Network layers**: IPv4 and IPv6 (extension headers walked)
//! - **Transport layers**: TCP and UDP
//! - **Tunnels**: IP-in-IP, GRE and VXLAN, searched for inner transports
//!
//! All views are zero-copy and borrow the captured frame; nothing here
//! allocates except the payload preview.
//!
//! # Example
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use sniffer_core::{RawPacket, TransportProtocol};
//! use sniffer_packet::{Classifier, FrameBuilder, LinkType};
//!
//! let frame = FrameBuilder::ethernet()
//!     .ipv4(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
//!     .tcp(40000, 80)
//!     .payload(b"GET / HTTP/1.1\r\n".to_vec())
//!     .build();
//!
//! let classifier = Classifier::new(LinkType::Ethernet, true);
//! let summary = classifier.classify(&RawPacket::new(frame)).unwrap();
//! assert_eq!(summary.protocol, TransportProtocol::Tcp);
//! ```

pub mod builder;
pub mod classify;
pub mod ethernet;
pub mod ip;
pub mod linktype;
pub mod tcp;
pub mod tunnel;
pub mod udp;

// Re-export commonly used types for convenience
pub use builder::FrameBuilder;
pub use classify::Classifier;
pub use ethernet::{EtherType, EthernetView, MacAddress};
pub use ip::{IpProtocol, IpView, Ipv4View, Ipv6View};
pub use linktype::LinkType;
pub use tcp::TcpView;
pub use tunnel::VXLAN_PORT;
pub use udp::UdpView;
