//! Packet types

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A captured frame, exactly as delivered by the capture source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// When the packet was captured
    pub timestamp: SystemTime,
    /// Captured bytes (including the link-layer header)
    pub data: Vec<u8>,
    /// Length on the wire (may exceed data.len() if truncated by snaplen)
    pub len: usize,
}

impl RawPacket {
    /// Create a packet stamped with the current time
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_timestamp(SystemTime::now(), data)
    }

    /// Create a packet with an explicit capture timestamp
    pub fn with_timestamp(timestamp: SystemTime, data: Vec<u8>) -> Self {
        let len = data.len();
        Self {
            timestamp,
            data,
            len,
        }
    }

    /// Set the original wire length
    pub fn with_wire_len(mut self, len: usize) -> Self {
        self.len = len.max(self.data.len());
        self
    }

    /// Get packet data as slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes actually captured
    pub fn caplen(&self) -> usize {
        self.data.len()
    }

    /// Get packet length on the wire
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if packet is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capture timestamp split into whole seconds and microseconds since the epoch
    pub fn epoch_micros(&self) -> (u64, u32) {
        let since_epoch = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        (since_epoch.as_secs(), since_epoch.subsec_micros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_len_never_below_caplen() {
        let packet = RawPacket::new(vec![0u8; 64]).with_wire_len(10);
        assert_eq!(packet.len(), 64);

        let packet = RawPacket::new(vec![0u8; 64]).with_wire_len(1500);
        assert_eq!(packet.len(), 1500);
        assert_eq!(packet.caplen(), 64);
    }

    #[test]
    fn test_epoch_micros() {
        let ts = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let packet = RawPacket::with_timestamp(ts, vec![1, 2, 3]);

        assert_eq!(packet.epoch_micros(), (1_700_000_000, 123_456));
    }
}
