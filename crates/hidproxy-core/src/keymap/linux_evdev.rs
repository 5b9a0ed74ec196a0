//! Linux input scancode to USB HID Usage ID translation table.
//!
//! Linux key codes are defined in `include/uapi/linux/input-event-codes.h`.
//! Reference: https://github.com/torvalds/linux/blob/master/include/uapi/linux/input-event-codes.h
//!
//! # What is a Linux scancode? (for beginners)
//!
//! Every `EV_KEY` event read from `/dev/input/eventN` carries a 16-bit *code*
//! naming the physical key, for example:
//!
//! | Constant         | Code | HID usage |
//! |------------------|------|-----------|
//! | `KEY_ESC`        | 1    | 0x29      |
//! | `KEY_A`          | 30   | 0x04      |
//! | `KEY_LEFTSHIFT`  | 42   | 0xE1      |
//! | `KEY_RIGHTMETA`  | 126  | 0xE7      |
//!
//! The numbering descends from the original IBM PC/AT set-1 scancodes, which
//! is why it bears no arithmetic relation to the HID numbering and a table is
//! needed.  Codes above 255 (`BTN_LEFT` = 272 and friends) are pointer buttons
//! and never appear here.

use super::hid::HidUsage;

/// Translates a Linux `EV_KEY` code into a [`HidUsage`].
///
/// Returns `None` if the code has no boot-keyboard equivalent.
///
/// # Panics
///
/// This function never panics.
pub fn scancode_to_hid(code: u16) -> Option<HidUsage> {
    match code {
        1 => Some(HidUsage::Escape),       // KEY_ESC
        2 => Some(HidUsage::Digit1),       // KEY_1
        3 => Some(HidUsage::Digit2),       // KEY_2
        4 => Some(HidUsage::Digit3),       // KEY_3
        5 => Some(HidUsage::Digit4),       // KEY_4
        6 => Some(HidUsage::Digit5),       // KEY_5
        7 => Some(HidUsage::Digit6),       // KEY_6
        8 => Some(HidUsage::Digit7),       // KEY_7
        9 => Some(HidUsage::Digit8),       // KEY_8
        10 => Some(HidUsage::Digit9),      // KEY_9
        11 => Some(HidUsage::Digit0),      // KEY_0
        12 => Some(HidUsage::Minus),       // KEY_MINUS
        13 => Some(HidUsage::Equal),       // KEY_EQUAL
        14 => Some(HidUsage::Backspace),   // KEY_BACKSPACE
        15 => Some(HidUsage::Tab),         // KEY_TAB
        16 => Some(HidUsage::KeyQ),        // KEY_Q
        17 => Some(HidUsage::KeyW),        // KEY_W
        18 => Some(HidUsage::KeyE),        // KEY_E
        19 => Some(HidUsage::KeyR),        // KEY_R
        20 => Some(HidUsage::KeyT),        // KEY_T
        21 => Some(HidUsage::KeyY),        // KEY_Y
        22 => Some(HidUsage::KeyU),        // KEY_U
        23 => Some(HidUsage::KeyI),        // KEY_I
        24 => Some(HidUsage::KeyO),        // KEY_O
        25 => Some(HidUsage::KeyP),        // KEY_P
        26 => Some(HidUsage::BracketLeft), // KEY_LEFTBRACE
        27 => Some(HidUsage::BracketRight), // KEY_RIGHTBRACE
        28 => Some(HidUsage::Enter),       // KEY_ENTER
        29 => Some(HidUsage::ControlLeft), // KEY_LEFTCTRL
        30 => Some(HidUsage::KeyA),        // KEY_A
        31 => Some(HidUsage::KeyS),        // KEY_S
        32 => Some(HidUsage::KeyD),        // KEY_D
        33 => Some(HidUsage::KeyF),        // KEY_F
        34 => Some(HidUsage::KeyG),        // KEY_G
        35 => Some(HidUsage::KeyH),        // KEY_H
        36 => Some(HidUsage::KeyJ),        // KEY_J
        37 => Some(HidUsage::KeyK),        // KEY_K
        38 => Some(HidUsage::KeyL),        // KEY_L
        39 => Some(HidUsage::Semicolon),   // KEY_SEMICOLON
        40 => Some(HidUsage::Quote),       // KEY_APOSTROPHE
        41 => Some(HidUsage::Backquote),   // KEY_GRAVE
        42 => Some(HidUsage::ShiftLeft),   // KEY_LEFTSHIFT
        43 => Some(HidUsage::Backslash),   // KEY_BACKSLASH
        44 => Some(HidUsage::KeyZ),        // KEY_Z
        45 => Some(HidUsage::KeyX),        // KEY_X
        46 => Some(HidUsage::KeyC),        // KEY_C
        47 => Some(HidUsage::KeyV),        // KEY_V
        48 => Some(HidUsage::KeyB),        // KEY_B
        49 => Some(HidUsage::KeyN),        // KEY_N
        50 => Some(HidUsage::KeyM),        // KEY_M
        51 => Some(HidUsage::Comma),       // KEY_COMMA
        52 => Some(HidUsage::Period),      // KEY_DOT
        53 => Some(HidUsage::Slash),       // KEY_SLASH
        54 => Some(HidUsage::ShiftRight),  // KEY_RIGHTSHIFT
        55 => Some(HidUsage::NumpadMultiply), // KEY_KPASTERISK
        56 => Some(HidUsage::AltLeft),     // KEY_LEFTALT
        57 => Some(HidUsage::Space),       // KEY_SPACE
        58 => Some(HidUsage::CapsLock),    // KEY_CAPSLOCK

        // Function keys F1–F10 are contiguous; F11/F12 live further up.
        59 => Some(HidUsage::F1),          // KEY_F1
        60 => Some(HidUsage::F2),          // KEY_F2
        61 => Some(HidUsage::F3),          // KEY_F3
        62 => Some(HidUsage::F4),          // KEY_F4
        63 => Some(HidUsage::F5),          // KEY_F5
        64 => Some(HidUsage::F6),          // KEY_F6
        65 => Some(HidUsage::F7),          // KEY_F7
        66 => Some(HidUsage::F8),          // KEY_F8
        67 => Some(HidUsage::F9),          // KEY_F9
        68 => Some(HidUsage::F10),         // KEY_F10
        69 => Some(HidUsage::NumLock),     // KEY_NUMLOCK
        70 => Some(HidUsage::ScrollLock),  // KEY_SCROLLLOCK

        // Keypad
        71 => Some(HidUsage::Numpad7),     // KEY_KP7
        72 => Some(HidUsage::Numpad8),     // KEY_KP8
        73 => Some(HidUsage::Numpad9),     // KEY_KP9
        74 => Some(HidUsage::NumpadSubtract), // KEY_KPMINUS
        75 => Some(HidUsage::Numpad4),     // KEY_KP4
        76 => Some(HidUsage::Numpad5),     // KEY_KP5
        77 => Some(HidUsage::Numpad6),     // KEY_KP6
        78 => Some(HidUsage::NumpadAdd),   // KEY_KPPLUS
        79 => Some(HidUsage::Numpad1),     // KEY_KP1
        80 => Some(HidUsage::Numpad2),     // KEY_KP2
        81 => Some(HidUsage::Numpad3),     // KEY_KP3
        82 => Some(HidUsage::Numpad0),     // KEY_KP0
        83 => Some(HidUsage::NumpadDecimal), // KEY_KPDOT

        86 => Some(HidUsage::IntlBackslash), // KEY_102ND
        87 => Some(HidUsage::F11),         // KEY_F11
        88 => Some(HidUsage::F12),         // KEY_F12
        96 => Some(HidUsage::NumpadEnter), // KEY_KPENTER
        97 => Some(HidUsage::ControlRight), // KEY_RIGHTCTRL
        98 => Some(HidUsage::NumpadDivide), // KEY_KPSLASH
        99 => Some(HidUsage::PrintScreen), // KEY_SYSRQ
        100 => Some(HidUsage::AltRight),   // KEY_RIGHTALT (AltGr)

        // Navigation cluster
        102 => Some(HidUsage::Home),       // KEY_HOME
        103 => Some(HidUsage::ArrowUp),    // KEY_UP
        104 => Some(HidUsage::PageUp),     // KEY_PAGEUP
        105 => Some(HidUsage::ArrowLeft),  // KEY_LEFT
        106 => Some(HidUsage::ArrowRight), // KEY_RIGHT
        107 => Some(HidUsage::End),        // KEY_END
        108 => Some(HidUsage::ArrowDown),  // KEY_DOWN
        109 => Some(HidUsage::PageDown),   // KEY_PAGEDOWN
        110 => Some(HidUsage::Insert),     // KEY_INSERT
        111 => Some(HidUsage::Delete),     // KEY_DELETE

        // Media keys
        113 => Some(HidUsage::Mute),       // KEY_MUTE
        114 => Some(HidUsage::VolumeDown), // KEY_VOLUMEDOWN
        115 => Some(HidUsage::VolumeUp),   // KEY_VOLUMEUP

        119 => Some(HidUsage::Pause),      // KEY_PAUSE
        125 => Some(HidUsage::MetaLeft),   // KEY_LEFTMETA
        126 => Some(HidUsage::MetaRight),  // KEY_RIGHTMETA
        127 => Some(HidUsage::ContextMenu), // KEY_COMPOSE

        // ThinkPad browser back/forward keys, sent as Undo/Again
        158 => Some(HidUsage::Undo),       // KEY_BACK
        159 => Some(HidUsage::Again),      // KEY_FORWARD

        _ => None,
    }
}
