//! UDP header parsing

/// Borrowed UDP datagram
#[derive(Debug, Clone, Copy)]
pub struct UdpView<'a> {
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// Length field (header + data)
    pub length: u16,
    /// Datagram payload, bounded by the length field when it is sane
    pub payload: &'a [u8],
}

impl<'a> UdpView<'a> {
    /// UDP header size in bytes
    pub const HEADER_SIZE: usize = 8;

    /// Parse a UDP datagram from bytes
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if data.len() < Self::HEADER_SIZE {
            return None;
        }

        let length = u16::from_be_bytes([data[4], data[5]]);
        // Length 0 is legal for IPv6 jumbograms; anything below 8 is bogus
        let end = match length as usize {
            0 => data.len(),
            len if len < Self::HEADER_SIZE => return None,
            len => len.min(data.len()),
        };

        Some(UdpView {
            source_port: u16::from_be_bytes([data[0], data[1]]),
            destination_port: u16::from_be_bytes([data[2], data[3]]),
            length,
            payload: &data[Self::HEADER_SIZE..end],
        })
    }

    /// True if either port matches
    pub fn uses_port(&self, port: u16) -> bool {
        self.source_port == port || self.destination_port == port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datagram(length: u16, payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&5353u16.to_be_bytes());
        data.extend_from_slice(&53u16.to_be_bytes());
        data.extend_from_slice(&length.to_be_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_parse_datagram() {
        let data = datagram(12, b"dns?");
        let udp = UdpView::parse(&data).unwrap();

        assert_eq!(udp.source_port, 5353);
        assert_eq!(udp.destination_port, 53);
        assert!(udp.uses_port(53));
        assert!(!udp.uses_port(80));
        assert_eq!(udp.payload, b"dns?");
    }

    #[test]
    fn test_length_field_bounds_payload() {
        let data = datagram(10, b"abcdef");
        assert_eq!(UdpView::parse(&data).unwrap().payload, b"ab");

        // Truncated capture: length claims more than was captured
        let data = datagram(400, b"abc");
        assert_eq!(UdpView::parse(&data).unwrap().payload, b"abc");
    }

    #[test]
    fn test_rejects_bogus_length() {
        assert!(UdpView::parse(&[0u8; 7]).is_none());
        assert!(UdpView::parse(&datagram(4, b"")).is_none());
    }
}
