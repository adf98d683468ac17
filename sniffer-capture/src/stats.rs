//! Capture statistics

use std::fmt;
use std::time::{Duration, Instant};

/// Counters for one capture, as seen by the pipeline and by libpcap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureStats {
    /// Packets handed to the pipeline
    pub packets_delivered: u64,
    /// Captured bytes handed to the pipeline
    pub bytes_delivered: u64,
    /// Packets that passed the kernel filter (libpcap)
    pub packets_received: u64,
    /// Packets dropped for lack of buffer space (libpcap)
    pub packets_dropped: u64,
    /// Packets dropped by the interface or driver (libpcap)
    pub packets_if_dropped: u64,
    /// Time since the capture was opened
    pub duration: Duration,
}

impl CaptureStats {
    /// Fold in the kernel-side counters reported by libpcap
    pub fn with_pcap_stats(mut self, stats: pcap::Stat) -> Self {
        self.packets_received = u64::from(stats.received);
        self.packets_dropped = u64::from(stats.dropped);
        self.packets_if_dropped = u64::from(stats.if_dropped);
        self
    }

    /// Dropped packets as a percentage of those the kernel saw
    pub fn drop_rate(&self) -> f64 {
        let seen = self.packets_received + self.packets_dropped;
        if seen == 0 {
            return 0.0;
        }
        (self.packets_dropped as f64 / seen as f64) * 100.0
    }

    pub fn packets_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.packets_delivered as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for CaptureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} packets ({} bytes) in {:.2}s ({:.1} pps), kernel received {}, dropped {} ({:.2}%), interface dropped {}",
            self.packets_delivered,
            self.bytes_delivered,
            self.duration.as_secs_f64(),
            self.packets_per_second(),
            self.packets_received,
            self.packets_dropped,
            self.drop_rate(),
            self.packets_if_dropped,
        )
    }
}

/// Running totals kept by a capture source
#[derive(Debug)]
pub struct StatsAccumulator {
    packets: u64,
    bytes: u64,
    start_time: Instant,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            packets: 0,
            bytes: 0,
            start_time: Instant::now(),
        }
    }

    /// Count one delivered packet of `size` captured bytes
    pub fn record_packet(&mut self, size: usize) {
        self.packets += 1;
        self.bytes += size as u64;
    }

    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            packets_delivered: self.packets,
            bytes_delivered: self.bytes,
            duration: self.start_time.elapsed(),
            ..CaptureStats::default()
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
