//! Per-keyboard key state and boot report derivation.
//!
//! # How a keyboard report is built (for beginners)
//!
//! A USB boot keyboard does not send "key pressed" / "key released" events.
//! Instead every report is a *snapshot* of everything currently held: one byte
//! of modifier bits and up to six usage IDs.  To release a key the device simply
//! sends a snapshot without it.
//!
//! evdev, on the other hand, delivers individual down/up transitions.  The
//! [`KeyState`] bridges the two: it remembers which usages are held, and after
//! every transition the full snapshot is rebuilt from scratch.  Rebuilding
//! rather than patching means a duplicated or lost event can only ever cause
//! one wrong frame, never a key that stays stuck forever.

use crate::keymap::hid::{HidUsage, ModifierBits};
use crate::keymap::ScancodeMap;
use crate::report::{KeyboardReport, KEY_SLOTS};

/// The meaning of an `EV_KEY` event's `value` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    /// Autorepeat generated by the kernel while a key is held.
    Repeat,
}

impl KeyAction {
    /// Decodes an `EV_KEY` value (0 = up, 1 = down, 2 = repeat).
    pub fn from_value(value: i32) -> Option<KeyAction> {
        match value {
            0 => Some(KeyAction::Up),
            1 => Some(KeyAction::Down),
            2 => Some(KeyAction::Repeat),
            _ => None,
        }
    }
}

/// The set of HID usages currently held on one keyboard.
///
/// Usages are kept in press order with no duplicates.  When more than six
/// non-modifier keys are held, the six pressed earliest are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    held: Vec<HidUsage>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `usage` as held.  Returns `false` if it already was.
    pub fn press(&mut self, usage: HidUsage) -> bool {
        if self.held.contains(&usage) {
            return false;
        }
        self.held.push(usage);
        true
    }

    /// Marks `usage` as released.  Returns `false` if it was not held.
    pub fn release(&mut self, usage: HidUsage) -> bool {
        let before = self.held.len();
        self.held.retain(|&u| u != usage);
        self.held.len() != before
    }

    pub fn contains(&self, usage: HidUsage) -> bool {
        self.held.contains(&usage)
    }

    /// Held usages in press order.
    pub fn iter(&self) -> impl Iterator<Item = HidUsage> + '_ {
        self.held.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Builds the boot report for the current state.
    ///
    /// Modifier usages only set their bit in byte 0 and never occupy a key slot.
    pub fn report(&self) -> KeyboardReport {
        let mut report = KeyboardReport::default();
        let mut slot = 0;
        for usage in self.iter() {
            match usage.modifier_bit() {
                Some(bit) => report.modifiers.insert(bit),
                None if slot < KEY_SLOTS => {
                    report.keys[slot] = usage.as_u8();
                    slot += 1;
                }
                // 7th and later simultaneous keys do not fit the boot layout.
                None => {}
            }
        }
        report
    }

    /// The modifier byte alone.
    pub fn modifiers(&self) -> ModifierBits {
        self.report().modifiers
    }
}

/// Result of feeding one `EV_KEY` event to a [`KeyboardTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key state changed (or was re-asserted); send this report.
    Report(KeyboardReport),
    /// The scancode has no HID usage; the event is dropped.
    Unknown(u16),
    /// Autorepeat or an unrecognised value; nothing to send.
    Ignored,
}

/// Translation table plus key state for one keyboard handler.
#[derive(Debug, Clone, Default)]
pub struct KeyboardTracker {
    map: ScancodeMap,
    state: KeyState,
}

impl KeyboardTracker {
    pub fn new(map: ScancodeMap) -> Self {
        Self {
            map,
            state: KeyState::new(),
        }
    }

    /// Applies one `EV_KEY` event and returns what, if anything, to emit.
    ///
    /// A down for an already-held key (or an up for a key not held) still
    /// produces a report; the snapshot is simply unchanged.
    pub fn handle(&mut self, scancode: u16, value: i32) -> KeyOutcome {
        let Some(usage) = self.map.lookup(scancode) else {
            return KeyOutcome::Unknown(scancode);
        };
        match KeyAction::from_value(value) {
            Some(KeyAction::Down) => {
                self.state.press(usage);
            }
            Some(KeyAction::Up) => {
                self.state.release(usage);
            }
            Some(KeyAction::Repeat) | None => return KeyOutcome::Ignored,
        }
        KeyOutcome::Report(self.state.report())
    }

    pub fn state(&self) -> &KeyState {
        &self.state
    }
}
