//! Session controller: owns one capture from open to artifact
//!
//! ```text
//! Idle --open ok--> Capturing --stop / error / end--> Finalizing --> Terminated
//!   \--open failed (nothing captured, no artifact)------------------> Terminated
//! ```

use sniffer_capture::{CaptureSource, CaptureStats, StopHandle};
use sniffer_core::{CaptureSession, Error, Result, TransportProtocol};
use sniffer_packet::Classifier;
use std::fmt;
use std::mem;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::console::ConsoleReporter;
use crate::logger::FileLogger;
use crate::recorder::{ArtifactWriter, CaptureArtifact, CaptureRecorder};
use crate::sink::{PacketSink, SinkSet};

/// Lifecycle of a [`SessionController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Finalizing,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Capturing => write!(f, "capturing"),
            SessionState::Finalizing => write!(f, "finalizing"),
            SessionState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Why the packet stream ended
#[derive(Debug)]
pub enum EndReason {
    /// Stop requested (operator interrupt or explicit stop)
    Stopped,
    /// The capture layer failed mid-session
    CaptureFailed(Error),
}

/// Per-tag packet counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolCounts {
    pub tcp: u64,
    pub udp: u64,
    pub other: u64,
}

impl ProtocolCounts {
    fn count(&mut self, protocol: TransportProtocol) {
        match protocol {
            TransportProtocol::Tcp => self.tcp += 1,
            TransportProtocol::Udp => self.udp += 1,
            TransportProtocol::Other => self.other += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.tcp + self.udp + self.other
    }
}

/// Outcome of a session whose artifact was saved
#[derive(Debug)]
pub struct SessionReport {
    pub session_id: Uuid,
    /// Packets the capture source delivered (all of them are in the artifact)
    pub packets_delivered: u64,
    /// Packets that produced a summary
    pub packets_summarized: u64,
    pub protocols: ProtocolCounts,
    /// Individual sink failures, all non-fatal
    pub sink_failures: u64,
    pub end: EndReason,
    pub artifact: CaptureArtifact,
    pub capture_stats: Option<CaptureStats>,
}

impl SessionReport {
    /// Packets recorded without a summary (no IP header)
    pub fn packets_unclassified(&self) -> u64 {
        self.packets_delivered - self.packets_summarized
    }

    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match &self.end {
            EndReason::Stopped => 0,
            EndReason::CaptureFailed(e) => e.exit_code(),
        }
    }
}

/// Drives capture, classification and dispatch for one session
pub struct SessionController {
    session: CaptureSession,
    state: SessionState,
    stop: StopHandle,
    pending_sinks: Vec<Box<dyn PacketSink>>,
    writer: Option<Box<dyn ArtifactWriter>>,
    active: Option<SinkSet>,
}

impl SessionController {
    /// A controller with no summary sinks
    pub fn new(session: CaptureSession) -> Self {
        Self {
            session,
            state: SessionState::Idle,
            stop: StopHandle::new(),
            pending_sinks: Vec::new(),
            writer: None,
            active: None,
        }
    }

    /// Console reporter on stdout, plus the file logger when the session
    /// names a log path
    pub fn with_default_sinks(session: CaptureSession, color: bool) -> Self {
        let log_path = session.log_path().map(|path| path.to_path_buf());
        let mut controller =
            Self::new(session).with_sink(Box::new(ConsoleReporter::stdout(color)));
        if let Some(path) = log_path {
            controller = controller.with_sink(Box::new(FileLogger::new(path)));
        }
        controller
    }

    pub fn with_sink(mut self, sink: Box<dyn PacketSink>) -> Self {
        self.pending_sinks.push(sink);
        self
    }

    /// Replace the pcap savefile writer used at finalize
    pub fn with_artifact_writer(mut self, writer: Box<dyn ArtifactWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle that ends the capture from any thread
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run the session to completion.
    ///
    /// `open` receives the session and the stop handle and returns the
    /// capture source. If it fails, the error is returned as is and no
    /// artifact is written. Once open, every way out of the capture loop
    /// goes through finalize.
    ///
    /// Returns `Err` for open failures and for a failed finalize. A capture
    /// error after open is reported in [`SessionReport::end`].
    pub fn run<S, F>(&mut self, open: F) -> Result<SessionReport>
    where
        S: CaptureSource,
        F: FnOnce(&CaptureSession, StopHandle) -> Result<S>,
    {
        if self.state != SessionState::Idle {
            return Err(Error::invalid_parameter(
                "session",
                "a capture session can only be run once",
            ));
        }

        let mut source = match open(&self.session, self.stop.clone()) {
            Ok(source) => source,
            Err(e) => {
                error!(session = %self.session.id(), error = %e, "failed to start capture");
                self.state = SessionState::Terminated;
                return Err(e);
            }
        };

        let link_type = source.link_type();
        let classifier = Classifier::for_session(&self.session, link_type);
        let mut recorder = CaptureRecorder::new(link_type, self.session.output_dir());
        if let Some(writer) = self.writer.take() {
            recorder = recorder.with_writer(writer);
        }
        let sinks = self.active.insert(SinkSet::with_sinks(
            recorder,
            mem::take(&mut self.pending_sinks),
        ));

        self.state = SessionState::Capturing;
        info!(
            session = %self.session.id(),
            interface = self.session.interface(),
            filter = self.session.filter().unwrap_or(""),
            link_type = %link_type,
            sinks = ?sinks.sink_names(),
            "session capturing"
        );

        let mut delivered = 0u64;
        let mut summarized = 0u64;
        let mut protocols = ProtocolCounts::default();
        let mut sink_failures = 0u64;

        let end = loop {
            match source.next_packet() {
                Ok(Some(packet)) => {
                    delivered += 1;
                    let summary = classifier.classify(&packet);
                    if let Some(summary) = &summary {
                        summarized += 1;
                        protocols.count(summary.protocol);
                    }
                    let outcome = sinks.dispatch(&packet, summary.as_ref());
                    sink_failures += outcome.failures.len() as u64;
                }
                Ok(None) => {
                    debug!("capture stream stopped");
                    break EndReason::Stopped;
                }
                Err(e) => {
                    error!(
                        error = %e,
                        packets = delivered,
                        "capture failed, saving what was captured"
                    );
                    break EndReason::CaptureFailed(e);
                }
            }
        };

        self.state = SessionState::Finalizing;
        let capture_stats = source.stats();
        drop(source);

        let artifact = sinks.finalize();
        self.state = SessionState::Terminated;
        let artifact = artifact?;

        info!(
            session = %self.session.id(),
            packets = delivered,
            summarized,
            sink_failures,
            "session terminated"
        );

        Ok(SessionReport {
            session_id: self.session.id(),
            packets_delivered: delivered,
            packets_summarized: summarized,
            protocols,
            sink_failures,
            end,
            artifact,
            capture_stats,
        })
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let Some(sinks) = self.active.as_mut() else {
            return;
        };
        if sinks.recorder().is_finalized() {
            return;
        }

        warn!(session = %self.session.id(), "session dropped mid-capture, saving capture");
        if let Err(e) = sinks.finalize() {
            error!(error = %e, "capture could not be saved");
        }
        self.state = SessionState::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Terminated.to_string(), "terminated");
    }

    #[test]
    fn test_protocol_counts() {
        let mut counts = ProtocolCounts::default();
        counts.count(TransportProtocol::Tcp);
        counts.count(TransportProtocol::Tcp);
        counts.count(TransportProtocol::Other);
        assert_eq!(counts.tcp, 2);
        assert_eq!(counts.udp, 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_new_controller_is_idle() {
        let session = CaptureSession::new("lo").unwrap();
        let controller = SessionController::new(session);
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(!controller.stop_handle().is_stopped());
        assert_eq!(controller.session().interface(), "lo");
    }
}
