//! Key code translation tables.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07, Keyboard/Keypad).
//! Linux input scancodes are translated to HID at the capture boundary and
//! nothing downstream of a capture handler ever sees a raw scancode again.

pub mod hid;
pub mod linux_evdev;

pub use hid::HidUsage;

/// Highest scancode the translation table can possibly map.
///
/// Everything above this is a pointer button, joystick or other non-keyboard
/// code in the Linux numbering.
const MAX_KEYBOARD_SCANCODE: u16 = 0xFF;

/// Immutable scancode → HID usage table shared by every keyboard handler.
///
/// The table is a compiled `match`, so a `ScancodeMap` is zero-sized and
/// `Copy`; handing one to each capture thread costs nothing and needs no
/// synchronisation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScancodeMap;

impl ScancodeMap {
    /// Creates the translation table.
    pub const fn new() -> Self {
        Self
    }

    /// Translates a Linux `EV_KEY` code into a [`HidUsage`].
    ///
    /// Returns `None` for codes with no keyboard equivalent; callers log and
    /// drop such events.
    pub fn lookup(&self, scancode: u16) -> Option<HidUsage> {
        linux_evdev::scancode_to_hid(scancode)
    }

    /// Iterates every `(scancode, usage)` pair the table knows, in scancode order.
    pub fn entries(&self) -> impl Iterator<Item = (u16, HidUsage)> + '_ {
        (0..=MAX_KEYBOARD_SCANCODE).filter_map(move |code| self.lookup(code).map(|u| (code, u)))
    }
}
