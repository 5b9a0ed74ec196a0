//! Input capture infrastructure.
//!
//! Keyboards and mice are read through the kernel's generic input layer
//! (evdev): every device is a character node under `/dev/input/eventN` that
//! yields fixed-size `input_event` records.  Each capture handler owns one
//! [`InputSource`] on a dedicated blocking thread; the supervisor discovers
//! devices through a [`DeviceEnumerator`].
//!
//! # Exclusive grab (for beginners)
//!
//! By default every reader of an evdev node sees every event, so a keyboard
//! would type both into the local console and, through the proxy, into the
//! downstream host.  `EVIOCGRAB` makes one file descriptor the sole consumer
//! until it is released or closed.
//!
//! # Testability
//!
//! Both traits allow unit and integration tests to inject scripted devices
//! without `/dev/input` access; see [`mock`].

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use hidproxy_core::{Capabilities, DeviceIdentity};
use thiserror::Error;

pub mod evdev_source;
pub mod mock;

/// A raw input event as read from a device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    /// `EV_KEY`: a key or button changed state (value 0 = up, 1 = down, 2 = repeat).
    Key { code: u16, value: i32 },
    /// `EV_REL`: relative motion on one axis.
    Relative { code: u16, value: i32 },
    /// Any other event type (`EV_SYN`, `EV_MSC`, `EV_LED`, ...).
    Other { event_type: u16, code: u16, value: i32 },
}

/// A device found during enumeration, before anything has been opened for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub identity: DeviceIdentity,
    pub capabilities: Capabilities,
}

/// Error type for input capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to list input devices: {0}")]
    Enumerate(#[source] io::Error),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to grab {device}: {source}")]
    Grab {
        device: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to set non-blocking mode on {device}: {source}")]
    NonBlocking {
        device: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to configure key repeat on {device}: {source}")]
    KeyRepeat {
        device: String,
        #[source]
        source: io::Error,
    },
    #[error("read from {device} failed: {source}")]
    Read {
        device: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} report queue is closed")]
    QueueClosed(hidproxy_core::ReportClass),
}

/// One opened input device, owned by exactly one capture handler.
///
/// All methods block; implementations are driven from a plain OS thread.
pub trait InputSource: Send {
    /// The device this source reads from.
    fn identity(&self) -> &DeviceIdentity;

    /// Acquires the device exclusively.
    fn grab(&mut self) -> Result<(), CaptureError>;

    /// Switches the descriptor to non-blocking reads.
    fn set_nonblocking(&mut self) -> Result<(), CaptureError>;

    /// Configures hardware key repeat: initial `delay` and repeat `period`.
    fn set_key_repeat(&mut self, delay: Duration, period: Duration) -> Result<(), CaptureError>;

    /// Waits at most `timeout` for the next event.
    ///
    /// Returns `Ok(None)` when the timeout elapses with nothing to read.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawInputEvent>, CaptureError>;

    /// Releases the exclusive grab.  Must be safe to call more than once.
    fn release(&mut self);
}

/// Lists present input devices and opens them for capture.
pub trait DeviceEnumerator: Send {
    /// Returns every input device currently present.
    fn enumerate(&mut self) -> Result<Vec<DiscoveredDevice>, CaptureError>;

    /// Opens the device identified by `identity` for capture.
    fn open(&mut self, identity: &DeviceIdentity) -> Result<Box<dyn InputSource>, CaptureError>;
}
