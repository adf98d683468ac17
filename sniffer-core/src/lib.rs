//! Sniffer Core Library
//!
//! This crate provides the data model shared by every stage of the
//! capture pipeline (raw packets, classification summaries, the session
//! description) together with the error taxonomy.

pub mod error;
pub mod packet;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use packet::RawPacket;
pub use session::CaptureSession;
pub use types::{PacketSummary, PayloadPreview, TransportProtocol, MAX_PREVIEW_LEN};
