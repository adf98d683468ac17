//! Live packet capture for the sniffer
//!
//! This crate is the source end of the pipeline: a pull-based
//! [`CaptureSource`] over libpcap that yields [`RawPacket`]s one at a time
//! until it is stopped.
//!
//! ## Features
//!
//! - **Kernel filtering**: BPF expressions are validated up front and
//!   installed on the device, so out-of-filter traffic never reaches the
//!   pipeline
//! - **Cooperative stop**: a cloneable [`StopHandle`] ends the stream from
//!   any thread, including a Ctrl-C handler
//! - **Typed open failures**: permission, interface and filter problems are
//!   distinct errors
//! - **Statistics**: delivered counts plus libpcap's kernel counters
//!
//! ## Example
//!
//! ```no_run
//! use sniffer_capture::{CaptureConfig, CaptureSource, PcapSource, StopHandle};
//! use sniffer_core::CaptureSession;
//!
//! # fn main() -> sniffer_core::Result<()> {
//! let session = CaptureSession::new("eth0")?.with_filter("udp");
//! let stop = StopHandle::new();
//! let mut source = PcapSource::open(&session, &CaptureConfig::default(), stop.clone())?;
//!
//! while let Some(packet) = source.next_packet()? {
//!     println!("{} bytes", packet.caplen());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`RawPacket`]: sniffer_core::RawPacket

pub mod capture;
pub mod filters;
pub mod interface;
pub mod stats;
pub mod stop;

// Re-export main types
pub use capture::{CaptureConfig, CaptureSource, PcapSource};
pub use interface::{get_interface, list_interfaces, InterfaceInfo};
pub use stats::{CaptureStats, StatsAccumulator};
pub use stop::StopHandle;
