//! Report sinks: where encoded reports are written.
//!
//! In production a sink is a USB gadget HID node (`/dev/hidg0` for the
//! keyboard function, `/dev/hidg1` for the mouse).  The kernel forwards each
//! `write(2)` as one interrupt-IN report to the USB host, so a frame must be
//! written in a single call with exactly the descriptor's report length.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for report sink operations.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to open {path} (is the gadget provisioned and are we root?): {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write to {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("short write to {path}: {written} of {expected} bytes")]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },
    #[error("failed to encode report: {0}")]
    Encode(#[from] hidproxy_core::ReportError),
}

/// Destination for encoded report frames.
///
/// Writes block until the frame has been handed to the device.
pub trait ReportSink: Send {
    /// Writes one complete frame.
    fn write_report(&mut self, frame: &[u8]) -> Result<(), WriteError>;

    /// Human-readable destination, used in log lines.
    fn describe(&self) -> String;
}

/// A gadget HID character device opened for writing.
#[derive(Debug)]
pub struct HidgSink {
    path: PathBuf,
    file: File,
}

impl HidgSink {
    /// Opens `path` write-only in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Open`] if the node is missing or not writable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WriteError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| WriteError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }
}

impl ReportSink for HidgSink {
    fn write_report(&mut self, frame: &[u8]) -> Result<(), WriteError> {
        let written = self.file.write(frame).map_err(|source| WriteError::Write {
            path: self.path.clone(),
            source,
        })?;
        if written != frame.len() {
            return Err(WriteError::ShortWrite {
                path: self.path.clone(),
                written,
                expected: frame.len(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
