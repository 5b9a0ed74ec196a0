//! Mock input sources for unit and integration testing.
//!
//! A [`MockInputSource`] replays a fixed script of [`ScriptStep`]s instead of
//! reading `/dev/input`.  Once the script is exhausted it behaves like an idle
//! device: every read times out.  A [`MockProbe`] handed out before the source
//! is moved into a capture handler lets tests observe grab/release calls.
//!
//! [`MockEnumerator`] is a shared, mutable device list so tests can plug and
//! unplug devices between supervisor ticks.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hidproxy_core::{Capabilities, DeviceIdentity};
use nix::errno::Errno;

use super::{CaptureError, DeviceEnumerator, DiscoveredDevice, InputSource, RawInputEvent};

/// How long an exhausted or `Timeout` step sleeps, capped by the caller's timeout.
const IDLE_SLEEP: Duration = Duration::from_millis(5);

/// One scripted read result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Event(RawInputEvent),
    Timeout,
    /// The read fails with this error kind (e.g. the device was unplugged).
    Fail(io::ErrorKind),
}

impl ScriptStep {
    pub fn key(code: u16, value: i32) -> Self {
        ScriptStep::Event(RawInputEvent::Key { code, value })
    }

    pub fn rel(code: u16, value: i32) -> Self {
        ScriptStep::Event(RawInputEvent::Relative { code, value })
    }

    /// An `EV_SYN / SYN_REPORT` marker.
    pub fn syn() -> Self {
        ScriptStep::Event(RawInputEvent::Other {
            event_type: 0,
            code: 0,
            value: 0,
        })
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    grabbed: bool,
    released: bool,
    key_repeat: Option<(Duration, Duration)>,
    events_read: usize,
}

/// Observes a [`MockInputSource`] after it has been moved elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl MockProbe {
    pub fn is_grabbed(&self) -> bool {
        self.state.lock().expect("lock poisoned").grabbed
    }

    pub fn was_released(&self) -> bool {
        self.state.lock().expect("lock poisoned").released
    }

    pub fn key_repeat(&self) -> Option<(Duration, Duration)> {
        self.state.lock().expect("lock poisoned").key_repeat
    }

    pub fn events_read(&self) -> usize {
        self.state.lock().expect("lock poisoned").events_read
    }
}

/// A mock implementation of [`InputSource`] replaying a script.
pub struct MockInputSource {
    identity: DeviceIdentity,
    script: VecDeque<ScriptStep>,
    grab_fails: bool,
    repeat_fails: bool,
    probe: MockProbe,
}

impl MockInputSource {
    pub fn new(identity: DeviceIdentity, script: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            identity,
            script: script.into_iter().collect(),
            grab_fails: false,
            repeat_fails: false,
            probe: MockProbe::default(),
        }
    }

    /// Makes [`InputSource::grab`] fail as if another process held the device.
    pub fn with_grab_failure(mut self) -> Self {
        self.grab_fails = true;
        self
    }

    /// Makes [`InputSource::set_key_repeat`] fail as on devices without repeat support.
    pub fn with_repeat_failure(mut self) -> Self {
        self.repeat_fails = true;
        self
    }

    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }

    fn device_label(&self) -> String {
        self.identity.to_string()
    }
}

impl InputSource for MockInputSource {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn grab(&mut self) -> Result<(), CaptureError> {
        if self.grab_fails {
            return Err(CaptureError::Grab {
                device: self.device_label(),
                source: io::Error::from(Errno::EBUSY),
            });
        }
        self.probe.state.lock().expect("lock poisoned").grabbed = true;
        Ok(())
    }

    fn set_nonblocking(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn set_key_repeat(&mut self, delay: Duration, period: Duration) -> Result<(), CaptureError> {
        if self.repeat_fails {
            return Err(CaptureError::KeyRepeat {
                device: self.device_label(),
                source: io::Error::from(io::ErrorKind::Unsupported),
            });
        }
        self.probe.state.lock().expect("lock poisoned").key_repeat = Some((delay, period));
        Ok(())
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawInputEvent>, CaptureError> {
        match self.script.pop_front() {
            Some(ScriptStep::Event(event)) => {
                self.probe.state.lock().expect("lock poisoned").events_read += 1;
                Ok(Some(event))
            }
            Some(ScriptStep::Fail(kind)) => Err(CaptureError::Read {
                device: self.device_label(),
                source: io::Error::from(kind),
            }),
            Some(ScriptStep::Timeout) | None => {
                std::thread::sleep(timeout.min(IDLE_SLEEP));
                Ok(None)
            }
        }
    }

    fn release(&mut self) {
        let mut state = self.probe.state.lock().expect("lock poisoned");
        if state.grabbed {
            state.grabbed = false;
            state.released = true;
        }
    }
}

// ── Enumerator ────────────────────────────────────────────────────────────────

struct MockDevice {
    discovered: DiscoveredDevice,
    script: Vec<ScriptStep>,
    grab_fails: bool,
    probe: MockProbe,
}

#[derive(Default)]
struct EnumeratorState {
    devices: Vec<MockDevice>,
    opened: Vec<DeviceIdentity>,
    enumerate_fails: bool,
}

/// A mock [`DeviceEnumerator`] over a mutable, shared device list.
///
/// Clones share the same list, so a test keeps one clone and hands the other
/// to the supervisor.
#[derive(Clone, Default)]
pub struct MockEnumerator {
    state: Arc<Mutex<EnumeratorState>>,
}

impl MockEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugs in a device; every `open` of it replays `script` from the start.
    pub fn add_device(
        &self,
        identity: DeviceIdentity,
        capabilities: Capabilities,
        script: Vec<ScriptStep>,
    ) -> MockProbe {
        self.insert(identity, capabilities, script, false)
    }

    /// Plugs in a device that is already grabbed by someone else.
    pub fn add_busy_device(&self, identity: DeviceIdentity, capabilities: Capabilities) -> MockProbe {
        self.insert(identity, capabilities, Vec::new(), true)
    }

    /// Unplugs a device; it disappears from the next enumeration.
    pub fn remove_device(&self, identity: &DeviceIdentity) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.devices.retain(|d| &d.discovered.identity != identity);
    }

    /// Makes subsequent enumerations fail.
    pub fn fail_enumeration(&self, fail: bool) {
        self.state.lock().expect("lock poisoned").enumerate_fails = fail;
    }

    /// Every identity opened so far, in order, including repeats.
    pub fn opened(&self) -> Vec<DeviceIdentity> {
        self.state.lock().expect("lock poisoned").opened.clone()
    }

    fn insert(
        &self,
        identity: DeviceIdentity,
        capabilities: Capabilities,
        script: Vec<ScriptStep>,
        grab_fails: bool,
    ) -> MockProbe {
        let probe = MockProbe::default();
        self.state.lock().expect("lock poisoned").devices.push(MockDevice {
            discovered: DiscoveredDevice {
                identity,
                capabilities,
            },
            script,
            grab_fails,
            probe: probe.clone(),
        });
        probe
    }
}

impl DeviceEnumerator for MockEnumerator {
    fn enumerate(&mut self) -> Result<Vec<DiscoveredDevice>, CaptureError> {
        let state = self.state.lock().expect("lock poisoned");
        if state.enumerate_fails {
            return Err(CaptureError::Enumerate(io::Error::from(
                io::ErrorKind::PermissionDenied,
            )));
        }
        Ok(state.devices.iter().map(|d| d.discovered.clone()).collect())
    }

    fn open(&mut self, identity: &DeviceIdentity) -> Result<Box<dyn InputSource>, CaptureError> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.opened.push(identity.clone());
        let device = state
            .devices
            .iter()
            .find(|d| &d.discovered.identity == identity)
            .ok_or_else(|| CaptureError::Open {
                path: identity.path.clone(),
                source: io::Error::from(io::ErrorKind::NotFound),
            })?;
        let mut source = MockInputSource::new(identity.clone(), device.script.clone());
        source.grab_fails = device.grab_fails;
        source.probe = device.probe.clone();
        Ok(Box::new(source))
    }
}
