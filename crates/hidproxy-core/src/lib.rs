//! # hidproxy-core
//!
//! Shared library for hidproxy containing the scancode translation tables,
//! the per-device key and mouse state trackers, and the USB HID boot-protocol
//! report encoding.
//!
//! It has zero dependencies on OS APIs, device nodes, or async runtimes, so
//! every piece of report-building logic can be tested on any machine.
//!
//! # Architecture overview (for beginners)
//!
//! hidproxy turns a Linux machine with USB gadget support into a transparent
//! bridge: Bluetooth keyboards and mice are read through the kernel's generic
//! input layer (evdev) and re-emitted as an ordinary wired USB keyboard/mouse
//! towards whatever host the gadget port is plugged into.
//!
//! This crate (`hidproxy-core`) is the translation heart of that bridge:
//!
//! - **`keymap`** – Static tables converting Linux input scancodes into USB
//!   HID Usage IDs, plus the modifier-bit assignment for the eight modifier
//!   keys.
//!
//! - **`domain`** – The mutable per-device trackers (`KeyState`,
//!   `MouseState`), device identity/classification, and the rolling latency
//!   statistics kept by the report writers.
//!
//! - **`report`** – The two fixed boot-protocol report layouts (8-byte
//!   keyboard, 4-byte mouse), their byte serialisation, and the HID report
//!   descriptors declared to the USB host during gadget provisioning.

pub mod domain;
pub mod keymap;
pub mod report;

// Re-export the most-used types at the crate root so callers can write
// `hidproxy_core::KeyState` instead of `hidproxy_core::domain::key_state::KeyState`.
pub use domain::device::{Capabilities, DeviceIdentity};
pub use domain::key_state::{KeyAction, KeyOutcome, KeyState, KeyboardTracker};
pub use domain::latency::LatencyStats;
pub use domain::mouse_state::{MouseAxis, MouseButton, MouseState};
pub use keymap::hid::{HidUsage, ModifierBits};
pub use keymap::ScancodeMap;
pub use report::{
    CapturedReport, KeyboardReport, MouseReport, Report, ReportClass, ReportError,
    KEYBOARD_REPORT_SIZE, MAX_REPORT_SIZE, MOUSE_REPORT_SIZE,
};
