//! Per-mouse button state and motion encoding.
//!
//! Buttons are sticky: the bitmask persists between events and is copied into
//! every report.  Motion is not: each `EV_REL` event becomes its own report
//! carrying only that axis, so a diagonal move arrives downstream as two
//! frames, one per axis, exactly as the kernel delivered it.

use crate::report::MouseReport;

/// `BTN_LEFT` in the Linux input numbering.
pub const BTN_LEFT: u16 = 0x110;
/// `BTN_RIGHT`.
pub const BTN_RIGHT: u16 = 0x111;
/// `BTN_MIDDLE`.
pub const BTN_MIDDLE: u16 = 0x112;

/// `REL_X`.
pub const REL_X: u16 = 0x00;
/// `REL_Y`.
pub const REL_Y: u16 = 0x01;
/// `REL_WHEEL` (one unit per detent).
pub const REL_WHEEL: u16 = 0x08;

/// Buttons carried by the boot mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Maps an `EV_KEY` code to a button; other codes return `None`.
    pub fn from_code(code: u16) -> Option<MouseButton> {
        match code {
            BTN_LEFT => Some(MouseButton::Left),
            BTN_RIGHT => Some(MouseButton::Right),
            BTN_MIDDLE => Some(MouseButton::Middle),
            _ => None,
        }
    }

    /// The button's bit in byte 0 of the report.
    pub fn bit(self) -> u8 {
        match self {
            MouseButton::Left => 1 << 0,
            MouseButton::Right => 1 << 1,
            MouseButton::Middle => 1 << 2,
        }
    }
}

/// Relative axes carried by the boot mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAxis {
    X,
    Y,
    Wheel,
}

impl MouseAxis {
    /// Maps an `EV_REL` code to an axis; other axes (horizontal wheel,
    /// high-resolution wheel) return `None`.
    pub fn from_code(code: u16) -> Option<MouseAxis> {
        match code {
            REL_X => Some(MouseAxis::X),
            REL_Y => Some(MouseAxis::Y),
            REL_WHEEL => Some(MouseAxis::Wheel),
            _ => None,
        }
    }
}

/// Button bitmask for one mouse handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    buttons: u8,
}

impl MouseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Applies a button transition (`value > 0` is pressed) and returns the
    /// zero-motion report announcing it.
    pub fn button(&mut self, button: MouseButton, value: i32) -> MouseReport {
        if value > 0 {
            self.buttons |= button.bit();
        } else {
            self.buttons &= !button.bit();
        }
        MouseReport {
            buttons: self.buttons,
            ..MouseReport::default()
        }
    }

    /// Builds a report moving a single axis by `delta`, saturated to ±127.
    pub fn motion(&self, axis: MouseAxis, delta: i32) -> MouseReport {
        let d = clamp_delta(delta);
        let mut report = MouseReport {
            buttons: self.buttons,
            ..MouseReport::default()
        };
        match axis {
            MouseAxis::X => report.dx = d,
            MouseAxis::Y => report.dy = d,
            MouseAxis::Wheel => report.wheel = d,
        }
        report
    }

    /// Feeds one `EV_KEY` event; returns `None` for codes that are not one of
    /// the three boot buttons.
    pub fn handle_key(&mut self, code: u16, value: i32) -> Option<MouseReport> {
        MouseButton::from_code(code).map(|b| self.button(b, value))
    }

    /// Feeds one `EV_REL` event; returns `None` for unsupported axes.
    pub fn handle_rel(&self, code: u16, value: i32) -> Option<MouseReport> {
        MouseAxis::from_code(code).map(|a| self.motion(a, value))
    }
}

/// Saturates a kernel delta into the descriptor's logical range −127..=127.
fn clamp_delta(delta: i32) -> i8 {
    delta.clamp(-127, 127) as i8
}
