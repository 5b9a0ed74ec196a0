//! In-memory report sinks for testing writers without a USB gadget.

use std::sync::{Arc, Mutex};

use super::writer::{ReportSink, WriteError};

/// Records every frame; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts `n` frames and then fails every write, like a
    /// gadget node whose UDC was unbound.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// Frames written so far, in write order.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().expect("lock poisoned").clone()
    }
}

impl ReportSink for RecordingSink {
    fn write_report(&mut self, frame: &[u8]) -> Result<(), WriteError> {
        let mut frames = self.frames.lock().expect("lock poisoned");
        if self.fail_after.is_some_and(|n| frames.len() >= n) {
            return Err(WriteError::Write {
                path: "memory".into(),
                source: std::io::Error::from(std::io::ErrorKind::BrokenPipe),
            });
        }
        frames.push(frame.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
