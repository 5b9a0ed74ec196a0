//! USB HID boot-protocol reports.
//!
//! Two fixed layouts are emitted, one per gadget function:
//!
//! ```text
//! Keyboard (8 bytes):  [modifiers, 0x00, k1, k2, k3, k4, k5, k6]
//! Mouse    (4 bytes):  [buttons, dx, dy, wheel]
//! ```
//!
//! Each frame is written to its gadget device node with a single `write(2)`,
//! with no length prefix or delimiter: the gadget driver knows the report
//! length from the descriptor declared at provisioning time, so the byte count
//! of every write must match it exactly.
//!
//! # Why a timestamp travels with every report (for beginners)
//!
//! Reports are produced by capture threads and consumed by a writer thread
//! on the other side of a bounded queue.  A [`CapturedReport`] carries the
//! [`Instant`] at which its input event was processed so the writer can
//! measure the full capture → queue → `write(2)` latency.

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::keymap::hid::ModifierBits;

pub mod descriptor;

/// Size in bytes of a keyboard boot report.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Size in bytes of a mouse boot report.
pub const MOUSE_REPORT_SIZE: usize = 4;

/// Largest report of any class; a buffer of this size fits every report.
pub const MAX_REPORT_SIZE: usize = KEYBOARD_REPORT_SIZE;

/// Number of non-modifier key slots in a keyboard boot report.
pub const KEY_SLOTS: usize = 6;

/// Errors that can occur while encoding a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The destination buffer cannot hold the report.
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
}

// ── Report class ──────────────────────────────────────────────────────────────

/// The two independent report streams, each with its own queue, writer and
/// gadget function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportClass {
    Keyboard,
    Mouse,
}

impl ReportClass {
    /// Exact byte length of every report of this class.
    pub fn report_len(self) -> usize {
        match self {
            ReportClass::Keyboard => KEYBOARD_REPORT_SIZE,
            ReportClass::Mouse => MOUSE_REPORT_SIZE,
        }
    }
}

impl fmt::Display for ReportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportClass::Keyboard => f.write_str("keyboard"),
            ReportClass::Mouse => f.write_str("mouse"),
        }
    }
}

// ── Keyboard ──────────────────────────────────────────────────────────────────

/// Standard USB HID boot-protocol keyboard report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardReport {
    /// Modifier key bitfield (byte 0).
    pub modifiers: ModifierBits,
    /// Up to six simultaneously pressed non-modifier usages; unused slots are 0.
    pub keys: [u8; KEY_SLOTS],
}

impl KeyboardReport {
    /// Returns the 8-byte wire representation.
    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_SIZE] {
        let mut out = [0u8; KEYBOARD_REPORT_SIZE];
        out[0] = self.modifiers.bits();
        // out[1] is the reserved byte and stays zero.
        out[2..].copy_from_slice(&self.keys);
        out
    }

    /// Serialises into `buf`, returning the number of bytes written (always 8).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::BufferTooSmall`] if `buf` is shorter than 8 bytes.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, ReportError> {
        let actual = buf.len();
        let dst = buf
            .get_mut(..KEYBOARD_REPORT_SIZE)
            .ok_or(ReportError::BufferTooSmall {
                needed: KEYBOARD_REPORT_SIZE,
                actual,
            })?;
        dst.copy_from_slice(&self.to_bytes());
        Ok(KEYBOARD_REPORT_SIZE)
    }

    /// Returns `true` if no key and no modifier is held (a release-all frame).
    pub fn is_empty(&self) -> bool {
        self.modifiers == ModifierBits::NONE && self.keys.iter().all(|&k| k == 0)
    }
}

// ── Mouse ─────────────────────────────────────────────────────────────────────

/// Standard USB HID boot-protocol mouse report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseReport {
    /// Button bitfield: bit 0 = left, bit 1 = right, bit 2 = middle.
    pub buttons: u8,
    /// Relative X movement.
    pub dx: i8,
    /// Relative Y movement.
    pub dy: i8,
    /// Vertical wheel movement.
    pub wheel: i8,
}

impl MouseReport {
    /// Returns the 4-byte wire representation; deltas are two's complement.
    pub fn to_bytes(&self) -> [u8; MOUSE_REPORT_SIZE] {
        [
            self.buttons,
            self.dx as u8,
            self.dy as u8,
            self.wheel as u8,
        ]
    }

    /// Serialises into `buf`, returning the number of bytes written (always 4).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::BufferTooSmall`] if `buf` is shorter than 4 bytes.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, ReportError> {
        let actual = buf.len();
        let dst = buf
            .get_mut(..MOUSE_REPORT_SIZE)
            .ok_or(ReportError::BufferTooSmall {
                needed: MOUSE_REPORT_SIZE,
                actual,
            })?;
        dst.copy_from_slice(&self.to_bytes());
        Ok(MOUSE_REPORT_SIZE)
    }
}

// ── Report envelope ───────────────────────────────────────────────────────────

/// A report of either class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
}

impl Report {
    /// The stream this report belongs to.
    pub fn class(&self) -> ReportClass {
        match self {
            Report::Keyboard(_) => ReportClass::Keyboard,
            Report::Mouse(_) => ReportClass::Mouse,
        }
    }

    /// Serialises into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::BufferTooSmall`] if `buf` cannot hold the report.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, ReportError> {
        match self {
            Report::Keyboard(r) => r.serialize(buf),
            Report::Mouse(r) => r.serialize(buf),
        }
    }
}

impl From<KeyboardReport> for Report {
    fn from(r: KeyboardReport) -> Self {
        Report::Keyboard(r)
    }
}

impl From<MouseReport> for Report {
    fn from(r: MouseReport) -> Self {
        Report::Mouse(r)
    }
}

/// A report plus the instant its input event was processed.
///
/// This is the unit placed on a writer's queue.
#[derive(Debug, Clone, Copy)]
pub struct CapturedReport {
    pub report: Report,
    pub captured_at: Instant,
}

impl CapturedReport {
    /// Stamps `report` with the current monotonic time.
    pub fn now(report: impl Into<Report>) -> Self {
        Self {
            report: report.into(),
            captured_at: Instant::now(),
        }
    }

    /// Time elapsed since capture.
    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }
}
