//! Example: classifying synthesised frames
//!
//! Builds a handful of frames and prints the summary the console reporter
//! would show for each.
//!
//! Run with: cargo run --example classify_frames -p sniffer-packet

use std::net::Ipv4Addr;

use sniffer_core::RawPacket;
use sniffer_packet::{Classifier, FrameBuilder, IpProtocol, LinkType};

fn main() {
    let client = Ipv4Addr::new(192, 168, 1, 100);
    let server = Ipv4Addr::new(93, 184, 216, 34);

    let frames = vec![
        (
            "HTTP request",
            FrameBuilder::ethernet()
                .ipv4(client, server)
                .tcp(51000, 80)
                .payload(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec())
                .build(),
        ),
        (
            "DNS query",
            FrameBuilder::ethernet()
                .ipv4(client, Ipv4Addr::new(1, 1, 1, 1))
                .udp(53000, 53)
                .payload(vec![0x12, 0x34, 0x01, 0x00, 0x00, 0x01])
                .build(),
        ),
        (
            "ICMP echo",
            FrameBuilder::ethernet()
                .ipv4(client, server)
                .ip_protocol(IpProtocol::ICMP)
                .payload(vec![8, 0, 0xF7, 0xFF, 0, 0, 0, 0])
                .build(),
        ),
        ("ARP request", FrameBuilder::ethernet().arp().build()),
    ];

    let classifier = Classifier::new(LinkType::Ethernet, true);

    for (label, frame) in frames {
        println!("{} ({} bytes)", label, frame.len());
        match classifier.classify(&RawPacket::new(frame)) {
            Some(summary) => {
                println!("  {} | {}", summary.flow(), summary.protocol);
                if let Some(preview) = &summary.preview {
                    println!("  Payload: {}", preview);
                }
            }
            None => println!("  not an IP packet (recorded only)"),
        }
    }
}
