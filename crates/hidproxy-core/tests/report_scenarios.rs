//! End-to-end report scenarios for the keyboard and mouse trackers.
//!
//! Each test feeds raw evdev `(code, value)` pairs exactly as a capture
//! handler would and checks the bytes that would reach the gadget node.

use hidproxy_core::domain::mouse_state::{BTN_LEFT, REL_WHEEL, REL_X, REL_Y};
use hidproxy_core::{
    HidUsage, KeyOutcome, KeyboardTracker, ModifierBits, MouseState, ScancodeMap,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn key_bytes(tracker: &mut KeyboardTracker, code: u16, value: i32) -> [u8; 8] {
    match tracker.handle(code, value) {
        KeyOutcome::Report(r) => r.to_bytes(),
        other => panic!("scancode {code} value {value} produced {other:?}"),
    }
}

/// Tiny deterministic xorshift so the property tests need no extra crate.
struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }
}

// ── Keyboard scenarios ────────────────────────────────────────────────────────

#[test]
fn test_key_a_down_then_up() {
    // Arrange
    let mut tracker = KeyboardTracker::new(ScancodeMap::new());

    // Act
    let down = key_bytes(&mut tracker, 30, 1);
    let up = key_bytes(&mut tracker, 30, 0);

    // Assert
    assert_eq!(down, [0, 0, 4, 0, 0, 0, 0, 0]);
    assert_eq!(up, [0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_left_shift_held_then_a() {
    let mut tracker = KeyboardTracker::new(ScancodeMap::new());

    let shift = key_bytes(&mut tracker, 42, 1);
    let shifted_a = key_bytes(&mut tracker, 30, 1);

    assert_eq!(shift, [2, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(shifted_a, [2, 0, 4, 0, 0, 0, 0, 0]);
}

#[test]
fn test_seven_simultaneous_keys_report_first_six_pressed() {
    // Arrange: Q W E R T Y U
    let mut tracker = KeyboardTracker::new(ScancodeMap::new());
    let codes = [16u16, 17, 18, 19, 20, 21, 22];

    // Act
    let mut last = [0u8; 8];
    for code in codes {
        last = key_bytes(&mut tracker, code, 1);
    }

    // Assert
    assert_eq!(tracker.state().len(), 7);
    assert_eq!(&last[2..], &[0x14, 0x1A, 0x08, 0x15, 0x17, 0x1C]);
    assert!(!last[2..].contains(&HidUsage::KeyU.as_u8()));
}

// ── Mouse scenarios ───────────────────────────────────────────────────────────

#[test]
fn test_left_click_without_motion() {
    let mut mouse = MouseState::new();

    let press = mouse.handle_key(BTN_LEFT, 1).expect("button report");
    let release = mouse.handle_key(BTN_LEFT, 0).expect("button report");

    assert_eq!(press.to_bytes(), [1, 0, 0, 0]);
    assert_eq!(release.to_bytes(), [0, 0, 0, 0]);
}

#[test]
fn test_relative_x_motion_of_five() {
    let mouse = MouseState::new();
    let report = mouse.handle_rel(REL_X, 5).expect("motion report");
    assert_eq!(report.to_bytes(), [0, 5, 0, 0]);
}

#[test]
fn test_diagonal_move_yields_one_report_per_axis() {
    let mut mouse = MouseState::new();
    mouse.handle_key(BTN_LEFT, 1);

    let x = mouse.handle_rel(REL_X, 3).expect("x");
    let y = mouse.handle_rel(REL_Y, -2).expect("y");
    let wheel = mouse.handle_rel(REL_WHEEL, 1).expect("wheel");

    assert_eq!(x.to_bytes(), [1, 3, 0, 0]);
    assert_eq!(y.to_bytes(), [1, 0, 0xFE, 0]);
    assert_eq!(wheel.to_bytes(), [1, 0, 0, 1]);
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn test_random_key_sequences_keep_state_consistent() {
    let map = ScancodeMap::new();
    let mapped: Vec<(u16, HidUsage)> = map.entries().collect();
    let mut rng = XorShift(0x9E37_79B9);

    for _round in 0..200 {
        let mut tracker = KeyboardTracker::new(map);
        for _ in 0..64 {
            let (code, usage) = mapped[rng.next() as usize % mapped.len()];
            let value = (rng.next() % 2) as i32;
            let report = match tracker.handle(code, value) {
                KeyOutcome::Report(r) => r,
                other => panic!("mapped scancode produced {other:?}"),
            };

            let held: Vec<HidUsage> = tracker.state().iter().collect();

            // No duplicates in the state.
            let mut dedup = held.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), held.len());

            // Key slots are exactly the first six held non-modifiers.
            let expected: Vec<u8> = held
                .iter()
                .filter(|u| !u.is_modifier())
                .take(6)
                .map(|u| u.as_u8())
                .collect();
            let slots: Vec<u8> = report.keys.iter().copied().filter(|&k| k != 0).collect();
            assert_eq!(slots, expected);
            assert!(report.keys.iter().all(|&k| k < 0xE0));

            // The touched modifier's bit mirrors its held state.
            if let Some(bit) = usage.modifier_bit() {
                assert_eq!(report.modifiers.contains(bit), value == 1);
            }
        }
    }
}

#[test]
fn test_modifier_up_clears_exactly_its_own_bit() {
    let map = ScancodeMap::new();
    let modifiers: Vec<(u16, ModifierBits)> = map
        .entries()
        .filter_map(|(code, usage)| usage.modifier_bit().map(|bit| (code, bit)))
        .collect();
    assert_eq!(modifiers.len(), 8);

    for &(released_code, released_bit) in &modifiers {
        // Arrange: hold all eight modifiers.
        let mut tracker = KeyboardTracker::new(map);
        for &(code, _) in &modifiers {
            tracker.handle(code, 1);
        }

        // Act
        let report = key_bytes(&mut tracker, released_code, 0);

        // Assert
        assert_eq!(report[0], 0xFF & !released_bit.bits());
    }
}
