//! Operator-facing text: banner and status lines

use crossterm::style::{style, Color, Stylize};

/// Kind of status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Failure,
}

impl Tone {
    fn marker(self) -> &'static str {
        match self {
            Tone::Info => "[*]",
            Tone::Success => "[✓]",
            Tone::Warning => "[*]",
            Tone::Failure => "[!]",
        }
    }

    fn color(self) -> Color {
        match self {
            Tone::Info => Color::Cyan,
            Tone::Success => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Failure => Color::Red,
        }
    }
}

const ART: &str = r"
  ___       _  __  __
 / __| _ _ (_)/ _|/ _| ___  _ _
 \__ \| ' \| |  _|  _|/ -_)| '_|
 |___/|_||_|_|_| |_|  \___||_|
";

/// Start-up banner with the version line
pub fn banner(color: bool) -> String {
    let text = format!(
        "{}\n  live packet capture v{}\n",
        ART,
        env!("CARGO_PKG_VERSION")
    );
    if color {
        style(text).with(Color::Cyan).to_string()
    } else {
        text
    }
}

/// `[*] text` style status line
pub fn message(tone: Tone, text: &str, color: bool) -> String {
    let line = format!("{} {}", tone.marker(), text);
    if color {
        style(line).with(tone.color()).to_string()
    } else {
        line
    }
}

/// Indented list entry
pub fn bullet(text: &str) -> String {
    format!("   ➤ {}", text)
}
