//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page) and modifier bits.
//!
//! These are the values that end up in the key slots of the 8-byte boot
//! keyboard report.  Every Linux scancode accepted by the proxy is translated
//! into one of these usages at capture time.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The **USB Human Interface Device (HID)** standard assigns a unique number to
//! every key on a keyboard.  These numbers are called *Usage IDs* and they are
//! grouped by *Usage Page*.  All keyboard keys are on page 0x07 ("Keyboard/Keypad").
//!
//! | Key          | HID Usage ID |
//! |--------------|-------------|
//! | Letter A     | 0x04        |
//! | Enter        | 0x28        |
//! | Left Ctrl    | 0xE0        |
//! | Right GUI    | 0xE7        |
//!
//! HID codes represent **physical key positions**, not characters.  The
//! character a key produces is decided by the downstream host's keyboard
//! layout, which is exactly what a transparent proxy wants.
//!
//! # Modifier usages
//!
//! Usages 0xE0–0xE7 are the eight modifier keys.  A boot-protocol report
//! never lists them in its six key slots; instead each one owns a single bit
//! of the report's first byte (see [`ModifierBits`]).  The bit index is the
//! usage minus 0xE0, so the mapping is one-to-one by construction.

/// First HID usage reserved for modifier keys (Left Control).
pub const FIRST_MODIFIER_USAGE: u8 = 0xE0;

/// USB HID Usage ID for keyboard keys (page 0x07).
///
/// The numeric value of each variant is its HID Usage ID on the keyboard/keypad page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum HidUsage {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control and punctuation keys (HID 0x28–0x38)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    CapsLock = 0x39,

    // Function keys (HID 0x3A–0x45)
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster (HID 0x46–0x52)
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Keypad (HID 0x53–0x63)
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    /// The extra key between Left Shift and Z on ISO keyboards.
    IntlBackslash = 0x64,
    ContextMenu = 0x65,

    // Editing and media keys
    Again = 0x79,
    Undo = 0x7A,
    Mute = 0x7F,
    VolumeUp = 0x80,
    VolumeDown = 0x81,

    // Modifier keys (HID 0xE0–0xE7)
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,
}

impl HidUsage {
    /// Returns the raw USB HID Usage ID value for this key.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` if this is one of the eight modifier keys.
    pub fn is_modifier(self) -> bool {
        self.as_u8() >= FIRST_MODIFIER_USAGE
    }

    /// Returns the modifier bit owned by this usage, or `None` for ordinary keys.
    pub fn modifier_bit(self) -> Option<ModifierBits> {
        if self.is_modifier() {
            Some(ModifierBits(1 << (self.as_u8() - FIRST_MODIFIER_USAGE)))
        } else {
            None
        }
    }
}

/// The modifier byte (byte 0) of a boot-protocol keyboard report.
///
/// Bit layout follows the HID boot keyboard definition:
///
/// ```text
/// bit 0 = Left Ctrl    bit 4 = Right Ctrl
/// bit 1 = Left Shift   bit 5 = Right Shift
/// bit 2 = Left Alt     bit 6 = Right Alt
/// bit 3 = Left Meta    bit 7 = Right Meta
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ModifierBits(pub u8);

impl ModifierBits {
    pub const NONE: ModifierBits = ModifierBits(0);
    pub const LEFT_CTRL: ModifierBits = ModifierBits(1 << 0);
    pub const LEFT_SHIFT: ModifierBits = ModifierBits(1 << 1);
    pub const LEFT_ALT: ModifierBits = ModifierBits(1 << 2);
    pub const LEFT_META: ModifierBits = ModifierBits(1 << 3);
    pub const RIGHT_CTRL: ModifierBits = ModifierBits(1 << 4);
    pub const RIGHT_SHIFT: ModifierBits = ModifierBits(1 << 5);
    pub const RIGHT_ALT: ModifierBits = ModifierBits(1 << 6);
    pub const RIGHT_META: ModifierBits = ModifierBits(1 << 7);

    /// Returns the raw modifier byte.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: ModifierBits) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets every bit of `other`.
    pub fn insert(&mut self, other: ModifierBits) {
        self.0 |= other.0;
    }

    /// Returns `true` if either Shift modifier is active.
    pub fn shift(self) -> bool {
        self.0 & (Self::LEFT_SHIFT.0 | Self::RIGHT_SHIFT.0) != 0
    }
}

impl std::ops::BitOr for ModifierBits {
    type Output = ModifierBits;

    fn bitor(self, rhs: ModifierBits) -> ModifierBits {
        ModifierBits(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODIFIERS: &[(HidUsage, ModifierBits)] = &[
        (HidUsage::ControlLeft, ModifierBits::LEFT_CTRL),
        (HidUsage::ShiftLeft, ModifierBits::LEFT_SHIFT),
        (HidUsage::AltLeft, ModifierBits::LEFT_ALT),
        (HidUsage::MetaLeft, ModifierBits::LEFT_META),
        (HidUsage::ControlRight, ModifierBits::RIGHT_CTRL),
        (HidUsage::ShiftRight, ModifierBits::RIGHT_SHIFT),
        (HidUsage::AltRight, ModifierBits::RIGHT_ALT),
        (HidUsage::MetaRight, ModifierBits::RIGHT_META),
    ];

    #[test]
    fn test_each_modifier_usage_owns_its_hid_bit() {
        for &(usage, expected) in MODIFIERS {
            // Arrange / Act
            let bit = usage.modifier_bit();

            // Assert
            assert_eq!(bit, Some(expected), "{usage:?} must map to {expected:?}");
        }
    }

    #[test]
    fn test_no_two_modifier_usages_share_a_bit() {
        let mut seen = 0u8;
        for &(usage, _) in MODIFIERS {
            let bit = usage.modifier_bit().expect("modifier").bits();
            assert_eq!(bit.count_ones(), 1, "{usage:?} must own exactly one bit");
            assert_eq!(seen & bit, 0, "{usage:?} collides with another modifier");
            seen |= bit;
        }
        assert_eq!(seen, 0xFF);
    }

    #[test]
    fn test_non_modifier_keys_have_no_modifier_bit() {
        for usage in [
            HidUsage::KeyA,
            HidUsage::Enter,
            HidUsage::F12,
            HidUsage::ContextMenu,
            HidUsage::VolumeDown,
        ] {
            assert!(!usage.is_modifier(), "{usage:?} should NOT be a modifier key");
            assert_eq!(usage.modifier_bit(), None);
        }
    }

    #[test]
    fn test_all_letter_keys_are_contiguous_from_0x04() {
        let letters = [
            HidUsage::KeyA, HidUsage::KeyB, HidUsage::KeyC, HidUsage::KeyD,
            HidUsage::KeyE, HidUsage::KeyF, HidUsage::KeyG, HidUsage::KeyH,
            HidUsage::KeyI, HidUsage::KeyJ, HidUsage::KeyK, HidUsage::KeyL,
            HidUsage::KeyM, HidUsage::KeyN, HidUsage::KeyO, HidUsage::KeyP,
            HidUsage::KeyQ, HidUsage::KeyR, HidUsage::KeyS, HidUsage::KeyT,
            HidUsage::KeyU, HidUsage::KeyV, HidUsage::KeyW, HidUsage::KeyX,
            HidUsage::KeyY, HidUsage::KeyZ,
        ];
        for (i, &letter) in letters.iter().enumerate() {
            assert_eq!(letter.as_u8(), 0x04 + i as u8, "{letter:?} is out of place");
        }
    }

    #[test]
    fn test_modifier_bits_insert_and_contains() {
        let mut bits = ModifierBits::NONE;
        bits.insert(ModifierBits::LEFT_SHIFT);
        bits.insert(ModifierBits::RIGHT_ALT);

        assert!(bits.contains(ModifierBits::LEFT_SHIFT));
        assert!(bits.contains(ModifierBits::LEFT_SHIFT | ModifierBits::RIGHT_ALT));
        assert!(!bits.contains(ModifierBits::LEFT_CTRL));
        assert!(bits.shift());
        assert_eq!(bits.bits(), 0b0100_0010);
    }
}
