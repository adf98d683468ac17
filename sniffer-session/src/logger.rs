//! Append-only text log of classified packets

use sniffer_core::{Error, PacketSummary, RawPacket, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::sink::PacketSink;

/// Appends `<src> -> <dst> | Protocol: <PROTO>` per packet.
///
/// The file is opened and closed around every write, so no handle is held
/// between packets.
#[derive(Debug, Clone)]
pub struct FileLogger {
    path: PathBuf,
}

impl FileLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

impl PacketSink for FileLogger {
    fn name(&self) -> &str {
        "file-logger"
    }

    fn on_packet(&mut self, summary: &PacketSummary, _packet: &RawPacket) -> Result<()> {
        let line = format!("{} | Protocol: {}\n", summary.flow(), summary.protocol);
        self.append(&line).map_err(|source| Error::LogWrite {
            path: self.path.clone(),
            source,
        })
    }
}
