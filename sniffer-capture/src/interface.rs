//! Network interface enumeration

use pnet_datalink::{self, NetworkInterface};
use sniffer_core::{Error, Result};
use std::fmt;
use std::net::IpAddr;

/// A host interface as shown to the operator
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    /// Interface name (e.g., "eth0", "wlan0")
    pub name: String,
    /// Human-readable description (often empty outside Windows)
    pub description: String,
    pub mac: Option<String>,
    pub ips: Vec<IpAddr>,
    pub is_up: bool,
    pub is_loopback: bool,
    /// OS interface index
    pub index: u32,
}

impl From<&NetworkInterface> for InterfaceInfo {
    fn from(iface: &NetworkInterface) -> Self {
        InterfaceInfo {
            name: iface.name.clone(),
            description: iface.description.clone(),
            mac: iface.mac.map(|mac| mac.to_string()),
            ips: iface.ips.iter().map(|network| network.ip()).collect(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
            index: iface.index,
        }
    }
}

impl fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;

        let mut flags = vec![if self.is_up { "up" } else { "down" }];
        if self.is_loopback {
            flags.push("loopback");
        }
        write!(f, " [{}]", flags.join(", "))?;

        if !self.ips.is_empty() {
            let ips: Vec<String> = self.ips.iter().map(IpAddr::to_string).collect();
            write!(f, " {}", ips.join(", "))?;
        }
        if !self.description.is_empty() {
            write!(f, " ({})", self.description)?;
        }
        Ok(())
    }
}

/// All interfaces the host reports, in OS order
pub fn list_interfaces() -> Vec<InterfaceInfo> {
    pnet_datalink::interfaces()
        .iter()
        .map(InterfaceInfo::from)
        .collect()
}

/// Look an interface up by exact name
pub fn get_interface(name: &str) -> Result<InterfaceInfo> {
    pnet_datalink::interfaces()
        .iter()
        .find(|iface| iface.name == name)
        .map(InterfaceInfo::from)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
}
