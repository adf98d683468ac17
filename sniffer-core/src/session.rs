//! Capture session description

use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::{Error, Result};

/// One capture run.
///
/// Built once from validated configuration and never mutated afterwards;
/// the classifier and the sinks receive it by reference.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    id: Uuid,
    interface: String,
    filter: String,
    payload_preview: bool,
    log_path: Option<PathBuf>,
    output_dir: PathBuf,
}

impl CaptureSession {
    /// Create a session on `interface` that matches all traffic
    pub fn new(interface: &str) -> Result<Self> {
        let interface = interface.trim();
        if interface.is_empty() {
            return Err(Error::invalid_parameter(
                "interface",
                "interface name must not be empty",
            ));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            interface: interface.to_string(),
            filter: String::new(),
            payload_preview: false,
            log_path: None,
            output_dir: PathBuf::from("."),
        })
    }

    /// Set the capture filter expression (empty means match all)
    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = filter.trim().to_string();
        self
    }

    /// Enable or disable payload previews
    pub fn with_payload_preview(mut self, enable: bool) -> Self {
        self.payload_preview = enable;
        self
    }

    /// Append one line per classified packet to `path`
    pub fn with_log_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Directory the capture artifact is written to
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Unique session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Interface name
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Filter expression, `None` when every packet should match
    pub fn filter(&self) -> Option<&str> {
        if self.filter.is_empty() {
            None
        } else {
            Some(&self.filter)
        }
    }

    pub fn payload_preview(&self) -> bool {
        self.payload_preview
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl fmt::Display for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (filter: {})",
            self.interface,
            self.filter().unwrap_or("<all>")
        )
    }
}
