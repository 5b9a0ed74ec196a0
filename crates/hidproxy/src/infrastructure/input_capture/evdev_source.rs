//! evdev-backed input source and device enumerator.
//!
//! Reads are bounded with `poll(2)`: the handler asks for the next event with
//! a timeout, the descriptor is polled for `POLLIN`, and only then is the
//! kernel buffer drained with `fetch_events`.  A single `read(2)` usually
//! returns a whole `SYN_REPORT` packet, so surplus events are queued in
//! `pending` and handed out one at a time.

use std::collections::VecDeque;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::time::Duration;

use evdev::{AutoRepeat, Device, EventType, InputEvent};
use hidproxy_core::{Capabilities, DeviceIdentity};
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use tracing::debug;

use super::{CaptureError, DeviceEnumerator, DiscoveredDevice, InputSource, RawInputEvent};

/// Name used when a driver does not report one.
const UNNAMED_DEVICE: &str = "?";

impl From<InputEvent> for RawInputEvent {
    fn from(ev: InputEvent) -> Self {
        let (event_type, code, value) = (ev.event_type(), ev.code(), ev.value());
        if event_type == EventType::KEY {
            RawInputEvent::Key { code, value }
        } else if event_type == EventType::RELATIVE {
            RawInputEvent::Relative { code, value }
        } else {
            RawInputEvent::Other {
                event_type: event_type.0,
                code,
                value,
            }
        }
    }
}

// ── Enumerator ────────────────────────────────────────────────────────────────

/// Lists `/dev/input/event*` nodes through [`evdev::enumerate`].
#[derive(Debug, Default)]
pub struct EvdevEnumerator;

impl EvdevEnumerator {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceEnumerator for EvdevEnumerator {
    fn enumerate(&mut self) -> Result<Vec<DiscoveredDevice>, CaptureError> {
        // Nodes we cannot open (permissions, races with unplug) are skipped
        // by evdev::enumerate itself.
        let devices = evdev::enumerate()
            .map(|(path, device)| {
                let events = device.supported_events();
                DiscoveredDevice {
                    identity: DeviceIdentity::new(path, device.name().unwrap_or(UNNAMED_DEVICE)),
                    capabilities: Capabilities {
                        keys: events.contains(EventType::KEY),
                        relative: events.contains(EventType::RELATIVE),
                    },
                }
            })
            .collect();
        Ok(devices)
    }

    fn open(&mut self, identity: &DeviceIdentity) -> Result<Box<dyn InputSource>, CaptureError> {
        let device = Device::open(&identity.path).map_err(|source| CaptureError::Open {
            path: identity.path.clone(),
            source,
        })?;
        Ok(Box::new(EvdevSource::new(identity.clone(), device)))
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

/// One opened evdev node.
pub struct EvdevSource {
    identity: DeviceIdentity,
    device: Device,
    pending: VecDeque<RawInputEvent>,
    grabbed: bool,
}

impl EvdevSource {
    pub fn new(identity: DeviceIdentity, device: Device) -> Self {
        Self {
            identity,
            device,
            pending: VecDeque::new(),
            grabbed: false,
        }
    }

    fn device_label(&self) -> String {
        self.identity.to_string()
    }

    /// Waits until the descriptor is readable; `false` on timeout or `EINTR`.
    fn wait_readable(&self, timeout: Duration) -> Result<bool, CaptureError> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        // SAFETY: the fd belongs to `self.device`, which outlives this call.
        let fd = unsafe { BorrowedFd::borrow_raw(self.device.as_raw_fd()) };
        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(0) | Err(Errno::EINTR) => Ok(false),
            Ok(_) => Ok(true),
            Err(errno) => Err(CaptureError::Read {
                device: self.device_label(),
                source: io::Error::from(errno),
            }),
        }
    }
}

impl InputSource for EvdevSource {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn grab(&mut self) -> Result<(), CaptureError> {
        self.device.grab().map_err(|source| CaptureError::Grab {
            device: self.device_label(),
            source,
        })?;
        self.grabbed = true;
        Ok(())
    }

    fn set_nonblocking(&mut self) -> Result<(), CaptureError> {
        let fd = self.device.as_raw_fd();
        let result = fcntl(fd, FcntlArg::F_GETFL).and_then(|bits| {
            let flags = OFlag::from_bits_truncate(bits) | OFlag::O_NONBLOCK;
            fcntl(fd, FcntlArg::F_SETFL(flags))
        });
        result.map(|_| ()).map_err(|errno| CaptureError::NonBlocking {
            device: self.device_label(),
            source: io::Error::from(errno),
        })
    }

    fn set_key_repeat(&mut self, delay: Duration, period: Duration) -> Result<(), CaptureError> {
        let repeat = AutoRepeat {
            delay: u32::try_from(delay.as_millis()).unwrap_or(u32::MAX),
            period: u32::try_from(period.as_millis()).unwrap_or(u32::MAX),
        };
        self.device
            .update_auto_repeat(&repeat)
            .map_err(|source| CaptureError::KeyRepeat {
                device: self.device_label(),
                source,
            })
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawInputEvent>, CaptureError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        if !self.wait_readable(timeout)? {
            return Ok(None);
        }
        match self.device.fetch_events() {
            Ok(events) => self.pending.extend(events.map(RawInputEvent::from)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(source) => {
                return Err(CaptureError::Read {
                    device: self.identity.to_string(),
                    source,
                })
            }
        }
        Ok(self.pending.pop_front())
    }

    fn release(&mut self) {
        if !self.grabbed {
            return;
        }
        self.grabbed = false;
        if let Err(e) = self.device.ungrab() {
            // Closing the descriptor drops the grab anyway.
            debug!("ungrab of {} failed: {e}", self.identity);
        }
    }
}

impl Drop for EvdevSource {
    fn drop(&mut self) {
        self.release();
    }
}
