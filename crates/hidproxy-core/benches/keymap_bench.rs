//! Criterion benchmarks for the keyboard/mouse hot path.
//!
//! Every captured input event goes through a scancode lookup and a full
//! report rebuild before it is queued, so these numbers bound the CPU share
//! of the capture-to-write latency.
//!
//! Run with:
//! ```bash
//! cargo bench --package hidproxy-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hidproxy_core::domain::mouse_state::{BTN_LEFT, REL_X};
use hidproxy_core::{KeyboardTracker, MouseState, ScancodeMap};

// ── Representative scancodes ──────────────────────────────────────────────────

/// Common keys plus one unmapped code (240, `KEY_UNKNOWN`).
const BENCH_SCANCODES: &[u16] = &[
    30,  // KEY_A
    44,  // KEY_Z
    28,  // KEY_ENTER
    1,   // KEY_ESC
    14,  // KEY_BACKSPACE
    57,  // KEY_SPACE
    59,  // KEY_F1
    88,  // KEY_F12
    29,  // KEY_LEFTCTRL
    42,  // KEY_LEFTSHIFT
    105, // KEY_LEFT
    115, // KEY_VOLUMEUP
    240, // KEY_UNKNOWN
];

// ── Benchmarks: translation table ────────────────────────────────────────────

fn bench_scancode_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_lookup");
    let map = ScancodeMap::new();

    group.bench_function("lookup_single", |b| b.iter(|| map.lookup(black_box(30))));

    group.bench_function("lookup_batch_13", |b| {
        b.iter(|| {
            BENCH_SCANCODES
                .iter()
                .map(|&code| map.lookup(black_box(code)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

// ── Benchmarks: report rebuild ───────────────────────────────────────────────

fn bench_keyboard_report_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyboard_tracker");

    // Down + up of one key against a state already holding `held` keys.
    for held in [0usize, 3, 6] {
        group.bench_with_input(BenchmarkId::new("down_up", held), &held, |b, &held| {
            let mut tracker = KeyboardTracker::new(ScancodeMap::new());
            for &code in &[16u16, 17, 18, 19, 20, 21][..held] {
                tracker.handle(code, 1);
            }
            b.iter(|| {
                let down = tracker.handle(black_box(30), 1);
                let up = tracker.handle(black_box(30), 0);
                (down, up)
            })
        });
    }

    group.finish();
}

fn bench_mouse_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("mouse_state");

    group.bench_function("button_press_release", |b| {
        let mut state = MouseState::new();
        b.iter(|| {
            let press = state.handle_key(black_box(BTN_LEFT), 1);
            let release = state.handle_key(black_box(BTN_LEFT), 0);
            (press, release)
        })
    });

    group.bench_function("motion_x", |b| {
        let state = MouseState::new();
        b.iter(|| state.handle_rel(black_box(REL_X), black_box(-42)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_scancode_lookup,
    bench_keyboard_report_rebuild,
    bench_mouse_events,
);
criterion_main!(benches);
