//! Example: list capture interfaces and check a filter against each link type
//!
//! Run with: cargo run --example list_interfaces -p sniffer-capture -- "tcp port 443"

use sniffer_capture::{filters, list_interfaces};
use sniffer_packet::LinkType;

fn main() {
    let expr = std::env::args().nth(1).unwrap_or_default();

    println!("=== Interfaces ===\n");
    for iface in list_interfaces() {
        println!("  {}", iface);
        if let Some(mac) = &iface.mac {
            println!("    MAC: {}", mac);
        }
    }

    let Some(filter) = filters::normalize(&expr) else {
        println!("\nNo filter given: every packet would be captured");
        return;
    };

    println!("\n=== Filter '{}' ===\n", filter);
    for link in [LinkType::Ethernet, LinkType::LinuxSll, LinkType::Raw] {
        match filters::validate(&filter, link) {
            Ok(()) => println!("  {:<10} ok", link.to_string()),
            Err(e) => println!("  {:<10} {}", link.to_string(), e),
        }
    }
}
