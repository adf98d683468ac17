//! CLI argument parsing

use clap::Parser;
use sniffer_capture::capture::{DEFAULT_SNAPLEN, DEFAULT_TIMEOUT_MS};
use sniffer_capture::CaptureConfig;
use sniffer_core::{CaptureSession, Error, Result};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "sniffer")]
#[command(
    version,
    about = "Live packet sniffer: console summaries, text log and pcap capture",
    long_about = None
)]
pub struct Cli {
    /// Network interface to capture on
    #[arg(short, long, value_name = "IFACE", required_unless_present = "list_interfaces")]
    pub interface: Option<String>,

    /// BPF capture filter (empty captures everything)
    #[arg(short, long, value_name = "EXPR", default_value = "")]
    pub filter: String,

    /// Show up to 40 bytes of each transport payload
    #[arg(short, long)]
    pub payload: bool,

    /// Append one line per packet to this file
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Directory for the capture_<date>_<time>.pcap file
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Snapshot length in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SNAPLEN)]
    pub snaplen: i32,

    /// Read timeout; also how often a stop request is noticed
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: i32,

    /// Kernel capture buffer size (0 = OS default)
    #[arg(long, value_name = "BYTES", default_value_t = 0)]
    pub buffer_size: i32,

    /// Do not put the interface in promiscuous mode
    #[arg(long)]
    pub no_promisc: bool,

    /// List available network interfaces and exit
    #[arg(long)]
    pub list_interfaces: bool,

    /// Disable color output
    #[arg(long)]
    pub no_color: bool,

    /// Do not print the start-up banner
    #[arg(long)]
    pub no_banner: bool,

    /// Verbose diagnostics on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The immutable session description for this run
    pub fn to_session(&self) -> Result<CaptureSession> {
        let interface = self
            .interface
            .as_deref()
            .ok_or_else(|| Error::invalid_parameter("interface", "an interface is required"))?;

        let mut session = CaptureSession::new(interface)?
            .with_filter(&self.filter)
            .with_payload_preview(self.payload)
            .with_output_dir(&self.output_dir);
        if let Some(log) = &self.log {
            session = session.with_log_path(log);
        }
        Ok(session)
    }

    pub fn capture_config(&self) -> Result<CaptureConfig> {
        let config = CaptureConfig {
            snaplen: self.snaplen,
            timeout_ms: self.timeout_ms,
            promiscuous: !self.no_promisc,
            buffer_size: self.buffer_size,
            ..CaptureConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn color(&self) -> bool {
        !self.no_color
    }

    /// Diagnostic level selected by `-v`
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sniffer").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["-i", "eth0"]);
        let session = cli.to_session().unwrap();

        assert_eq!(session.interface(), "eth0");
        assert_eq!(session.filter(), None);
        assert!(!session.payload_preview());
        assert!(session.log_path().is_none());
        assert_eq!(session.output_dir(), Path::new("."));

        let config = cli.capture_config().unwrap();
        assert_eq!(config, CaptureConfig::default());
        assert_eq!(cli.log_level(), Level::WARN);
        assert!(cli.color());
    }

    #[test]
    fn test_full_session() {
        let cli = parse(&[
            "--interface",
            "wlan0",
            "-f",
            "udp port 53",
            "-p",
            "-l",
            "/tmp/sniffer.log",
            "-o",
            "/tmp/captures",
            "--no-color",
            "-vv",
        ]);
        let session = cli.to_session().unwrap();

        assert_eq!(session.filter(), Some("udp port 53"));
        assert!(session.payload_preview());
        assert_eq!(session.log_path(), Some(Path::new("/tmp/sniffer.log")));
        assert_eq!(session.output_dir(), Path::new("/tmp/captures"));
        assert!(!cli.color());
        assert_eq!(cli.log_level(), Level::DEBUG);
    }

    #[test]
    fn test_capture_options() {
        let cli = parse(&[
            "-i",
            "eth0",
            "--snaplen",
            "128",
            "--timeout-ms",
            "250",
            "--buffer-size",
            "4194304",
            "--no-promisc",
        ]);
        let config = cli.capture_config().unwrap();

        assert_eq!(config.snaplen, 128);
        assert_eq!(config.timeout_ms, 250);
        assert_eq!(config.buffer_size, 4_194_304);
        assert!(!config.promiscuous);
    }

    #[test]
    fn test_invalid_snaplen() {
        let cli = parse(&["-i", "eth0", "--snaplen", "0"]);
        assert!(matches!(
            cli.capture_config(),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_interface_required() {
        assert!(Cli::try_parse_from(["sniffer"]).is_err());

        let cli = parse(&["--list-interfaces"]);
        assert!(cli.list_interfaces);
        assert!(matches!(
            cli.to_session(),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_blank_interface_rejected() {
        let cli = parse(&["-i", "  "]);
        assert!(cli.to_session().is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["-i", "lo", "-v"]).log_level(), Level::INFO);
        assert_eq!(parse(&["-i", "lo", "-vvvv"]).log_level(), Level::TRACE);
    }
}
