//! Input device identity and classification.

use std::fmt;
use std::path::PathBuf;

use crate::report::ReportClass;

/// Identifies one physical input source for the whole of its capture lifecycle.
///
/// The pair is used as the key of the supervisor's handler map, so the same
/// device seen on two consecutive polls is recognised as already handled.
/// Bluetooth devices keep their name across reconnects but usually get a new
/// `/dev/input/eventN` node, which yields a fresh identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    /// Device node, e.g. `/dev/input/event3`.
    pub path: PathBuf,
    /// Human-readable name reported by the kernel driver.
    pub name: String,
}

impl DeviceIdentity {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Returns `true` if this device belongs to the Bluetooth device `bt_name`.
    ///
    /// Kernel input names are derived from the Bluetooth name, sometimes with a
    /// suffix such as `" Mouse"` or `" Keyboard"` for composite devices, hence
    /// the prefix match.
    pub fn matches_bluetooth_name(&self, bt_name: &str) -> bool {
        self.name.starts_with(bt_name)
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Event-type capability bits relevant to classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Device can emit `EV_KEY` events.
    pub keys: bool,
    /// Device can emit `EV_REL` (relative motion) events.
    pub relative: bool,
}

impl Capabilities {
    /// Decides which capture handler, if any, a device gets.
    ///
    /// Relative motion wins over keys: every mouse also advertises `EV_KEY`
    /// for its buttons, so a device with both is captured as a mouse.
    pub fn classify(self) -> Option<ReportClass> {
        match (self.relative, self.keys) {
            (true, _) => Some(ReportClass::Mouse),
            (false, true) => Some(ReportClass::Keyboard),
            (false, false) => None,
        }
    }
}
