//! Classification results shared by the classifier and the packet sinks

use std::fmt;
use std::net::IpAddr;
use std::time::SystemTime;

/// Maximum number of transport payload bytes kept in a preview
pub const MAX_PREVIEW_LEN: usize = 40;

/// Transport protocol tag attached to every IP packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    /// A TCP header was found
    Tcp,
    /// A UDP header was found (and no TCP header)
    Udp,
    /// IP packet with neither transport header
    Other,
}

impl TransportProtocol {
    /// Upper-case tag used in console and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Tcp => "TCP",
            TransportProtocol::Udp => "UDP",
            TransportProtocol::Other => "OTHER",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First bytes of a transport payload, never empty and never longer than
/// [`MAX_PREVIEW_LEN`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPreview(Vec<u8>);

impl PayloadPreview {
    /// Build a preview from a transport payload.
    ///
    /// Returns `None` for an empty payload.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.is_empty() {
            return None;
        }
        let end = payload.len().min(MAX_PREVIEW_LEN);
        Some(Self(payload[..end].to_vec()))
    }

    /// Get preview bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the preview
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PayloadPreview {
    /// Printable ASCII as-is, everything else escaped
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.0.escape_ascii())
    }
}

/// Read-only view of one classified IP packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketSummary {
    /// Capture timestamp of the underlying packet
    pub timestamp: SystemTime,
    /// Source address of the outermost IP header
    pub source: IpAddr,
    /// Destination address of the outermost IP header
    pub destination: IpAddr,
    /// Transport classification
    pub protocol: TransportProtocol,
    /// Optional bounded payload preview
    pub preview: Option<PayloadPreview>,
}

impl PacketSummary {
    /// `<src> -> <dst>` part shared by every output line
    pub fn flow(&self) -> String {
        format!("{} -> {}", self.source, self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_protocol_tags() {
        assert_eq!(TransportProtocol::Tcp.to_string(), "TCP");
        assert_eq!(TransportProtocol::Udp.to_string(), "UDP");
        assert_eq!(TransportProtocol::Other.to_string(), "OTHER");
    }

    #[test]
    fn test_preview_bounds() {
        assert!(PayloadPreview::from_payload(&[]).is_none());

        let short = PayloadPreview::from_payload(b"ping").unwrap();
        assert_eq!(short.as_bytes(), b"ping");

        let long = PayloadPreview::from_payload(&[0x41; 100]).unwrap();
        assert_eq!(long.len(), MAX_PREVIEW_LEN);
    }

    #[test]
    fn test_preview_display_escapes() {
        let preview = PayloadPreview::from_payload(b"GET /\r\n\x00").unwrap();
        assert_eq!(preview.to_string(), "b\"GET /\\r\\n\\x00\"");
    }

    #[test]
    fn test_summary_flow() {
        let summary = PacketSummary {
            timestamp: SystemTime::now(),
            source: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            destination: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
            protocol: TransportProtocol::Udp,
            preview: None,
        };
        assert_eq!(summary.flow(), "10.0.0.1 -> 10.0.0.2");
    }
}
