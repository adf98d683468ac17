//! TCP header parsing

/// Borrowed TCP segment
#[derive(Debug, Clone, Copy)]
pub struct TcpView<'a> {
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// Raw flag byte (CWR..FIN)
    pub flags: u8,
    /// Header length in bytes, options included
    pub header_len: usize,
    /// Segment payload
    pub payload: &'a [u8],
}

impl<'a> TcpView<'a> {
    /// Minimum TCP header size (without options)
    pub const MIN_HEADER_SIZE: usize = 20;

    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;

    /// Parse a TCP segment from bytes.
    ///
    /// Returns `None` when the header is truncated or its data offset is
    /// inconsistent; callers treat that as "no TCP header".
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if data.len() < Self::MIN_HEADER_SIZE {
            return None;
        }

        let header_len = ((data[12] >> 4) as usize) * 4;
        if header_len < Self::MIN_HEADER_SIZE || data.len() < header_len {
            return None;
        }

        Some(TcpView {
            source_port: u16::from_be_bytes([data[0], data[1]]),
            destination_port: u16::from_be_bytes([data[2], data[3]]),
            flags: data[13],
            header_len,
            payload: &data[header_len..],
        })
    }

    pub fn has_flag(&self, flag: u8) -> bool {
        self.flags & flag == flag
    }
}
