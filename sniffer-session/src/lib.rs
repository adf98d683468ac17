//! Capture session orchestration for the sniffer
//!
//! This crate joins the capture source to its consumers:
//!
//! - `SessionController`: the `Idle → Capturing → Finalizing → Terminated`
//!   state machine that pulls packets, classifies them and dispatches them
//! - `SinkSet`: synchronous, in-order fan-out with per-sink failure isolation
//! - `ConsoleReporter` and `FileLogger`: the summary sinks
//! - `CaptureRecorder`: keeps every packet and writes the pcap artifact
//!   exactly once, on every termination path
//!
//! # Example
//!
//! ```no_run
//! use sniffer_capture::{CaptureConfig, PcapSource};
//! use sniffer_core::CaptureSession;
//! use sniffer_session::SessionController;
//!
//! # fn main() -> sniffer_core::Result<()> {
//! let session = CaptureSession::new("eth0")?.with_filter("udp");
//! let config = CaptureConfig::default();
//!
//! let mut controller = SessionController::with_default_sinks(session, true);
//! let report = controller.run(|session, stop| PcapSource::open(session, &config, stop))?;
//! println!("Saved captured packets to: {}", report.artifact.path.display());
//! # Ok(())
//! # }
//! ```

pub mod console;
pub mod controller;
pub mod logger;
pub mod recorder;
pub mod sink;


pub use console::ConsoleReporter;
pub use controller::{EndReason, ProtocolCounts, SessionController, SessionReport, SessionState};
pub use logger::FileLogger;
pub use recorder::{
    artifact_file_name, ArtifactWriter, CaptureArtifact, CaptureRecorder, PcapArtifactWriter,
};
pub use sink::{DispatchOutcome, PacketSink, SinkFailure, SinkSet};
