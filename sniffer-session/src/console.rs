//! Console reporter: one human-readable line per classified packet

use chrono::{DateTime, Local};
use crossterm::style::{style, Attribute, Color, Stylize};
use sniffer_core::{PacketSummary, RawPacket, Result, TransportProtocol};
use std::io::{self, Write};

use crate::sink::PacketSink;

/// Writes `[HH:MM:SS] <src> -> <dst> | <PROTO>` lines, plus an indented
/// payload line when the summary carries a preview
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PacketSink for ConsoleReporter<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn on_packet(&mut self, summary: &PacketSummary, _packet: &RawPacket) -> Result<()> {
        writeln!(self.out, "{}", format_summary(summary, self.color))?;
        if let Some(preview) = &summary.preview {
            writeln!(self.out, "    Payload: {}", preview)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Render the summary line, without the payload line
pub fn format_summary(summary: &PacketSummary, color: bool) -> String {
    let time = DateTime::<Local>::from(summary.timestamp).format("%H:%M:%S");
    let stamp = format!("[{}]", time);
    let protocol = summary.protocol.as_str();

    if color {
        format!(
            "{} {} | {}",
            style(stamp).with(Color::DarkGrey),
            summary.flow(),
            style(protocol)
                .with(protocol_color(summary.protocol))
                .attribute(Attribute::Bold)
        )
    } else {
        format!("{} {} | {}", stamp, summary.flow(), protocol)
    }
}

fn protocol_color(protocol: TransportProtocol) -> Color {
    match protocol {
        TransportProtocol::Tcp => Color::Green,
        TransportProtocol::Udp => Color::Cyan,
        TransportProtocol::Other => Color::Yellow,
    }
}
