//! Command-line front end for the sniffer
//!
//! Argument parsing and operator-facing text. The `sniffer` binary wires
//! these to the capture session.

pub mod args;
pub mod banner;

pub use args::Cli;
pub use banner::{banner, bullet, message, Tone};
