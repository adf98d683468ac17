//! Error types for the sniffer workspace

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sniffer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sniffer
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error outside of a more specific category
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Interface does not exist on this host
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Interface exists but cannot be captured on
    #[error("Interface '{interface}' unavailable: {reason}")]
    InterfaceUnavailable { interface: String, reason: String },

    /// Capture filter failed to compile
    #[error("Invalid capture filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    /// Insufficient privileges to open the capture device
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Capture layer failed while the session was running
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// A line could not be appended to the text log
    #[error("Failed to write log file '{}': {source}", path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The capture artifact could not be persisted
    #[error("Failed to save capture file: {0}")]
    Finalize(String),
}

impl Error {
    /// Create a capture error with a custom message
    pub fn capture<S: Into<String>>(msg: S) -> Self {
        Error::Capture(msg.into())
    }

    /// Create a finalize error with a custom message
    pub fn finalize<S: Into<String>>(msg: S) -> Self {
        Error::Finalize(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised before any packet could have been captured.
    ///
    /// These end the process without producing a capture artifact.
    pub fn is_pre_capture(&self) -> bool {
        matches!(
            self,
            Error::InterfaceNotFound(_)
                | Error::InterfaceUnavailable { .. }
                | Error::InvalidFilter { .. }
                | Error::PermissionDenied(_)
                | Error::InvalidParameter { .. }
        )
    }

    /// Process exit status reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InterfaceNotFound(_)
            | Error::InterfaceUnavailable { .. }
            | Error::InvalidFilter { .. }
            | Error::InvalidParameter { .. } => 2,
            // EX_NOPERM
            Error::PermissionDenied(_) => 77,
            Error::Capture(_) => 3,
            Error::Finalize(_) => 4,
            Error::Io(_) | Error::LogWrite { .. } => 1,
        }
    }
}
