//! Capture recorder: keeps every packet and persists them once

use chrono::{DateTime, Local};
use pcap::{Capture, Linktype, Packet, PacketHeader};
use sniffer_core::{Error, RawPacket, Result};
use sniffer_packet::LinkType;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// The persisted capture file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    pub path: PathBuf,
    pub packet_count: usize,
}

impl CaptureArtifact {
    /// File name without the directory
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// `capture_YYYYMMDD_HHMMSS.pcap` for the given end time
pub fn artifact_file_name(ended_at: DateTime<Local>) -> String {
    format!("capture_{}.pcap", ended_at.format("%Y%m%d_%H%M%S"))
}

/// Writes a whole packet sequence to one file
pub trait ArtifactWriter {
    fn write(&mut self, path: &Path, link_type: LinkType, packets: &[RawPacket]) -> Result<()>;
}

/// libpcap savefile writer (classic pcap, microsecond timestamps)
#[derive(Debug, Default, Clone, Copy)]
pub struct PcapArtifactWriter;

impl ArtifactWriter for PcapArtifactWriter {
    fn write(&mut self, path: &Path, link_type: LinkType, packets: &[RawPacket]) -> Result<()> {
        let dead = Capture::dead(Linktype(link_type.dlt()))
            .map_err(|e| Error::finalize(format!("cannot open pcap writer: {}", e)))?;
        let mut savefile = dead
            .savefile(path)
            .map_err(|e| Error::finalize(format!("{}: {}", path.display(), e)))?;

        for packet in packets {
            let (secs, micros) = packet.epoch_micros();
            let header = PacketHeader {
                ts: libc::timeval {
                    tv_sec: secs as libc::time_t,
                    tv_usec: micros as libc::suseconds_t,
                },
                caplen: packet.caplen() as u32,
                len: packet.len() as u32,
            };
            savefile.write(&Packet::new(&header, packet.data()));
        }

        savefile
            .flush()
            .map_err(|e| Error::finalize(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Debug)]
enum RecorderState {
    Recording,
    Finalized(CaptureArtifact),
    Failed(String),
}

/// Append-only, in-order store of every packet the source delivered
pub struct CaptureRecorder {
    link_type: LinkType,
    output_dir: PathBuf,
    packets: Vec<RawPacket>,
    writer: Box<dyn ArtifactWriter>,
    state: RecorderState,
}

impl CaptureRecorder {
    pub fn new(link_type: LinkType, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            link_type,
            output_dir: output_dir.into(),
            packets: Vec::new(),
            writer: Box::new(PcapArtifactWriter),
            state: RecorderState::Recording,
        }
    }

    pub fn with_writer(mut self, writer: Box<dyn ArtifactWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Append a packet. Ignored once the recorder has been finalized.
    pub fn record(&mut self, packet: RawPacket) {
        match self.state {
            RecorderState::Recording => self.packets.push(packet),
            _ => warn!("packet arrived after finalize, not recorded"),
        }
    }

    /// Packets held (until finalize succeeds)
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        !matches!(self.state, RecorderState::Recording)
    }

    /// Write the artifact, named from the current local time.
    ///
    /// Runs the writer at most once. Later calls return the first
    /// outcome again, so every termination path may call this safely.
    /// An empty recording still produces a valid, empty file.
    pub fn finalize(&mut self) -> Result<CaptureArtifact> {
        self.finalize_at(Local::now())
    }

    pub fn finalize_at(&mut self, ended_at: DateTime<Local>) -> Result<CaptureArtifact> {
        match &self.state {
            RecorderState::Finalized(artifact) => return Ok(artifact.clone()),
            RecorderState::Failed(reason) => return Err(Error::finalize(reason.clone())),
            RecorderState::Recording => {}
        }

        let path = self.output_dir.join(artifact_file_name(ended_at));
        debug!(
            path = %path.display(),
            packets = self.packets.len(),
            "writing capture artifact"
        );

        match self.writer.write(&path, self.link_type, &self.packets) {
            Ok(()) => {
                let artifact = CaptureArtifact {
                    path,
                    packet_count: self.packets.len(),
                };
                info!(
                    path = %artifact.path.display(),
                    packets = artifact.packet_count,
                    "capture artifact saved"
                );
                self.packets = Vec::new();
                self.state = RecorderState::Finalized(artifact.clone());
                Ok(artifact)
            }
            Err(e) => {
                let reason = match e {
                    Error::Finalize(reason) => reason,
                    other => format!("{}: {}", path.display(), other),
                };
                error!(reason = %reason, "failed to save capture artifact");
                self.state = RecorderState::Failed(reason.clone());
                Err(Error::Finalize(reason))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, UNIX_EPOCH};

    /// One call to an artifact writer
    #[derive(Debug, Clone)]
    pub(crate) struct Written {
        pub path: PathBuf,
        pub link_type: LinkType,
        pub packets: Vec<RawPacket>,
    }

    /// Artifact writer that keeps everything in memory
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MemoryWriter {
        pub calls: Rc<RefCell<Vec<Written>>>,
        pub fail: bool,
    }

    impl ArtifactWriter for MemoryWriter {
        fn write(&mut self, path: &Path, link_type: LinkType, packets: &[RawPacket]) -> Result<()> {
            self.calls.borrow_mut().push(Written {
                path: path.to_path_buf(),
                link_type,
                packets: packets.to_vec(),
            });
            if self.fail {
                Err(Error::finalize("No space left on device"))
            } else {
                Ok(())
            }
        }
    }

    fn ended_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).single().unwrap()
    }

    fn packet(n: u8) -> RawPacket {
        RawPacket::with_timestamp(UNIX_EPOCH + Duration::from_secs(n as u64), vec![n; 60])
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name(ended_at()), "capture_20240309_140507.pcap");
    }

    #[test]
    fn test_finalize_keeps_order() {
        let writer = MemoryWriter::default();
        let calls = Rc::clone(&writer.calls);
        let mut recorder = CaptureRecorder::new(LinkType::Ethernet, "/captures")
            .with_writer(Box::new(writer));

        for n in 0..3 {
            recorder.record(packet(n));
        }
        let artifact = recorder.finalize_at(ended_at()).unwrap();

        assert_eq!(artifact.packet_count, 3);
        assert_eq!(
            artifact.path,
            PathBuf::from("/captures/capture_20240309_140507.pcap")
        );
        assert_eq!(artifact.file_name(), "capture_20240309_140507.pcap");

        let calls = calls.borrow();
        let firsts: Vec<u8> = calls[0].packets.iter().map(|p| p.data[0]).collect();
        assert_eq!(firsts, vec![0, 1, 2]);
        assert_eq!(calls[0].link_type, LinkType::Ethernet);
    }

    #[test]
    fn test_finalize_runs_writer_once() {
        let writer = MemoryWriter::default();
        let calls = Rc::clone(&writer.calls);
        let mut recorder = CaptureRecorder::new(LinkType::Raw, ".").with_writer(Box::new(writer));

        recorder.record(packet(1));
        let first = recorder.finalize().unwrap();
        let second = recorder.finalize().unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.borrow().len(), 1);
        assert!(recorder.is_finalized());

        // Recording is closed after finalize
        recorder.record(packet(2));
        assert_eq!(recorder.finalize().unwrap().packet_count, 1);
    }

    #[test]
    fn test_failed_finalize_is_not_retried() {
        let writer = MemoryWriter {
            fail: true,
            ..MemoryWriter::default()
        };
        let calls = Rc::clone(&writer.calls);
        let mut recorder =
            CaptureRecorder::new(LinkType::Ethernet, ".").with_writer(Box::new(writer));
        recorder.record(packet(1));

        assert!(matches!(recorder.finalize(), Err(Error::Finalize(_))));
        match recorder.finalize() {
            Err(Error::Finalize(reason)) => assert!(reason.contains("No space left")),
            other => panic!("Expected Finalize error, got {:?}", other),
        }
        assert_eq!(calls.borrow().len(), 1);
        // Packets are kept when nothing was written
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_empty_recording_still_finalizes() {
        let writer = MemoryWriter::default();
        let calls = Rc::clone(&writer.calls);
        let mut recorder =
            CaptureRecorder::new(LinkType::Ethernet, ".").with_writer(Box::new(writer));

        assert!(recorder.is_empty());
        assert_eq!(recorder.finalize().unwrap().packet_count, 0);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_pcap_writer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = CaptureRecorder::new(LinkType::Ethernet, dir.path());

        let first = packet(7).with_wire_len(1514);
        recorder.record(first.clone());
        recorder.record(packet(8));
        let artifact = recorder.finalize().unwrap();
        assert!(artifact.path.starts_with(dir.path()));

        let mut capture = Capture::from_file(&artifact.path).unwrap();
        assert_eq!(capture.get_datalink(), Linktype::ETHERNET);

        let read = capture.next_packet().unwrap();
        assert_eq!(read.data, first.data());
        assert_eq!(read.header.len, 1514);
        assert_eq!(read.header.ts.tv_sec as u64, 7);

        assert!(capture.next_packet().is_ok());
        assert!(capture.next_packet().is_err());
    }

    #[test]
    fn test_pcap_writer_empty_file_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = CaptureRecorder::new(LinkType::LinuxSll, dir.path());

        let artifact = recorder.finalize().unwrap();
        let mut capture = Capture::from_file(&artifact.path).unwrap();
        assert_eq!(capture.get_datalink(), Linktype(113));
        assert!(matches!(capture.next_packet(), Err(pcap::Error::NoMorePackets)));
    }

    #[test]
    fn test_pcap_writer_unwritable_directory() {
        let mut recorder = CaptureRecorder::new(LinkType::Ethernet, "/nonexistent/sniffer/dir");
        assert!(matches!(recorder.finalize(), Err(Error::Finalize(_))));
    }
}
