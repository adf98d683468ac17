//! Capture sources: the pull side of the pipeline

use pcap::{Active, Capture, PacketHeader};
use sniffer_core::{CaptureSession, Error, RawPacket, Result};
use sniffer_packet::LinkType;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, trace};

use crate::stats::{CaptureStats, StatsAccumulator};
use crate::stop::StopHandle;

/// Default snapshot length (maximum bytes per packet)
pub const DEFAULT_SNAPLEN: i32 = 65535;

/// Default read timeout (milliseconds); also the stop-flag poll period
pub const DEFAULT_TIMEOUT_MS: i32 = 1000;

/// Device-level capture settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Maximum bytes to capture per packet
    pub snaplen: i32,
    /// Read timeout in milliseconds
    pub timeout_ms: i32,
    /// Enable promiscuous mode
    pub promiscuous: bool,
    /// Kernel buffer size (0 = OS default)
    pub buffer_size: i32,
    /// Deliver packets as soon as they arrive
    pub immediate_mode: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            promiscuous: true,
            buffer_size: 0,
            immediate_mode: true,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.snaplen <= 0 {
            return Err(Error::invalid_parameter("snaplen", "must be positive"));
        }
        // A zero timeout blocks forever and the stop flag would never be polled
        if self.timeout_ms <= 0 {
            return Err(Error::invalid_parameter("timeout_ms", "must be positive"));
        }
        if self.buffer_size < 0 {
            return Err(Error::invalid_parameter("buffer_size", "must not be negative"));
        }
        Ok(())
    }
}

/// A lazy, non-restartable stream of captured packets with a single reader.
///
/// `Ok(None)` means the stream ended because a stop was requested. An
/// error ends the stream too; callers should not poll again after either.
pub trait CaptureSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>>;

    /// Link-layer type of every packet this source yields
    fn link_type(&self) -> LinkType;

    /// Counters so far, if the source keeps any
    fn stats(&mut self) -> Option<CaptureStats> {
        None
    }
}

/// Live capture on one interface through libpcap
pub struct PcapSource {
    interface: String,
    capture: Capture<Active>,
    link_type: LinkType,
    stop: StopHandle,
    stats: StatsAccumulator,
}

impl PcapSource {
    /// Open the session's interface and install its filter in the kernel.
    ///
    /// Fails with [`Error::PermissionDenied`], [`Error::InterfaceUnavailable`]
    /// or [`Error::InvalidFilter`]; nothing has been captured when it does.
    pub fn open(
        session: &CaptureSession,
        config: &CaptureConfig,
        stop: StopHandle,
    ) -> Result<Self> {
        config.validate()?;
        let interface = session.interface();

        debug!(
            interface,
            snaplen = config.snaplen,
            promiscuous = config.promiscuous,
            "opening capture device"
        );

        let mut inactive = Capture::from_device(interface)
            .map_err(|e| open_error(interface, e))?
            .promisc(config.promiscuous)
            .snaplen(config.snaplen)
            .timeout(config.timeout_ms)
            .immediate_mode(config.immediate_mode);

        if config.buffer_size > 0 {
            inactive = inactive.buffer_size(config.buffer_size);
        }

        let mut capture = inactive.open().map_err(|e| open_error(interface, e))?;

        if let Some(filter) = session.filter() {
            capture
                .filter(filter, true)
                .map_err(|e| Error::InvalidFilter {
                    filter: filter.to_string(),
                    reason: e.to_string(),
                })?;
            debug!(filter, "capture filter installed");
        }

        let link_type = LinkType::from_dlt(capture.get_datalink().0);
        stop.attach(capture.breakloop_handle());

        info!(interface, link_type = %link_type, "capture started");

        Ok(Self {
            interface: interface.to_string(),
            capture,
            link_type,
            stop,
            stats: StatsAccumulator::new(),
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl CaptureSource for PcapSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>> {
        loop {
            if self.stop.is_stopped() {
                return Ok(None);
            }

            match self.capture.next_packet() {
                Ok(packet) => {
                    let timestamp = header_time(packet.header);
                    let raw = RawPacket::with_timestamp(timestamp, packet.data.to_vec())
                        .with_wire_len(packet.header.len as usize);
                    self.stats.record_packet(raw.caplen());
                    trace!(caplen = raw.caplen(), len = raw.len(), "packet captured");
                    return Ok(Some(raw));
                }
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => {
                    debug!(interface = %self.interface, "capture loop broken");
                    return Ok(None);
                }
                Err(e) => {
                    return Err(Error::capture(format!("{}: {}", self.interface, e)));
                }
            }
        }
    }

    fn link_type(&self) -> LinkType {
        self.link_type
    }

    fn stats(&mut self) -> Option<CaptureStats> {
        let snapshot = self.stats.snapshot();
        match self.capture.stats() {
            Ok(stat) => Some(snapshot.with_pcap_stats(stat)),
            Err(e) => {
                debug!(error = %e, "libpcap statistics unavailable");
                Some(snapshot)
            }
        }
    }
}

impl Drop for PcapSource {
    fn drop(&mut self) {
        self.stop.detach();
    }
}

fn header_time(header: &PacketHeader) -> SystemTime {
    let secs = u64::try_from(header.ts.tv_sec).unwrap_or(0);
    let micros = u32::try_from(header.ts.tv_usec).unwrap_or(0).min(999_999);
    UNIX_EPOCH + Duration::new(secs, micros * 1000)
}

/// Sort a libpcap open failure into the pre-capture error it represents
fn open_error(interface: &str, err: pcap::Error) -> Error {
    let reason = err.to_string();
    let lower = reason.to_lowercase();

    if lower.contains("permission") || lower.contains("not permitted") {
        Error::PermissionDenied(format!("{}: {}", interface, reason))
    } else {
        Error::InterfaceUnavailable {
            interface: interface.to_string(),
            reason,
        }
    }
}
