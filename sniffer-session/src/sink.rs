//! Packet sinks and synchronous fan-out

use sniffer_core::{Error, PacketSummary, RawPacket, Result};
use tracing::{trace, warn};

use crate::recorder::{CaptureArtifact, CaptureRecorder};

/// A consumer of classified packets.
///
/// Sinks only see packets that produced a summary. A failing sink is
/// reported and skipped for that packet; it never stops the capture or the
/// other sinks.
pub trait PacketSink {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    fn on_packet(&mut self, summary: &PacketSummary, packet: &RawPacket) -> Result<()>;
}

/// One sink's failure on one packet
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: String,
    pub error: Error,
}

/// What happened to a single dispatched packet
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Sinks that accepted the summary
    pub delivered: usize,
    pub failures: Vec<SinkFailure>,
}

impl DispatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The capture recorder plus any number of summary sinks
pub struct SinkSet {
    recorder: CaptureRecorder,
    sinks: Vec<Box<dyn PacketSink>>,
}

impl SinkSet {
    pub fn new(recorder: CaptureRecorder) -> Self {
        Self {
            recorder,
            sinks: Vec::new(),
        }
    }

    pub fn with_sinks(recorder: CaptureRecorder, sinks: Vec<Box<dyn PacketSink>>) -> Self {
        Self { recorder, sinks }
    }

    pub fn add_sink(&mut self, sink: Box<dyn PacketSink>) {
        self.sinks.push(sink);
    }

    /// Names of the summary sinks, in dispatch order
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    /// Hand one packet to every sink, in registration order.
    ///
    /// The recorder always keeps the packet. Summary sinks run only when
    /// the packet was classified.
    pub fn dispatch(
        &mut self,
        packet: &RawPacket,
        summary: Option<&PacketSummary>,
    ) -> DispatchOutcome {
        self.recorder.record(packet.clone());

        let mut outcome = DispatchOutcome::default();
        let Some(summary) = summary else {
            trace!(caplen = packet.caplen(), "no summary, recorded only");
            return outcome;
        };

        for sink in self.sinks.iter_mut() {
            match sink.on_packet(summary, packet) {
                Ok(()) => outcome.delivered += 1,
                Err(error) => {
                    warn!(sink = sink.name(), error = %error, "sink failed");
                    outcome.failures.push(SinkFailure {
                        sink: sink.name().to_string(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    pub fn recorder(&self) -> &CaptureRecorder {
        &self.recorder
    }

    /// Persist everything recorded so far; see [`CaptureRecorder::finalize`]
    pub fn finalize(&mut self) -> Result<CaptureArtifact> {
        self.recorder.finalize()
    }
}
