//! Integration tests for the device supervisor's handler lifecycle.
//!
//! A `MockEnumerator` stands in for `/dev/input`; devices are plugged and
//! unplugged between calls to `DeviceSupervisor::tick`.

use std::io;
use std::time::{Duration, Instant};

use hidproxy::application::capture::KeyRepeat;
use hidproxy::application::supervise::{
    DeviceSupervisor, DisconnectNotice, ReportQueues, SupervisorOptions, TickReport,
};
use hidproxy::infrastructure::input_capture::mock::{MockEnumerator, MockProbe, ScriptStep};
use hidproxy_core::{Capabilities, CapturedReport, DeviceIdentity, Report};
use tokio::sync::mpsc;

const KEY_A: u16 = 30;
const KEYBOARD: Capabilities = Capabilities { keys: true, relative: false };
const MOUSE: Capabilities = Capabilities { keys: true, relative: true };

// ── Harness ───────────────────────────────────────────────────────────────────

struct Harness {
    enumerator: MockEnumerator,
    supervisor: DeviceSupervisor<MockEnumerator>,
    notices: mpsc::Sender<DisconnectNotice>,
    keyboard_rx: mpsc::Receiver<CapturedReport>,
    mouse_rx: mpsc::Receiver<CapturedReport>,
}

impl Harness {
    fn new() -> Self {
        let enumerator = MockEnumerator::new();
        let (keyboard_tx, keyboard_rx) = mpsc::channel(10);
        let (mouse_tx, mouse_rx) = mpsc::channel(100);
        let (notices, notice_rx) = mpsc::channel(8);
        let options = SupervisorOptions {
            keyboard: true,
            mouse: true,
            repeat: KeyRepeat {
                delay: Duration::from_millis(300),
                period: Duration::from_millis(62),
            },
        };
        let queues = ReportQueues {
            keyboard: Some(keyboard_tx),
            mouse: Some(mouse_tx),
        };
        Self {
            supervisor: DeviceSupervisor::new(enumerator.clone(), options, queues, notice_rx),
            enumerator,
            notices,
            keyboard_rx,
            mouse_rx,
        }
    }

    /// Ticks until `done` holds for the accumulated tick reports, or fails after 5 s.
    fn tick_until(&mut self, mut done: impl FnMut(&TickReport) -> bool) -> TickReport {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut total = TickReport::default();
        loop {
            let r = self.supervisor.tick();
            total.cancelled += r.cancelled;
            total.started += r.started;
            total.finished += r.finished;
            if done(&total) {
                return total;
            }
            assert!(Instant::now() < deadline, "condition not reached: {total:?}");
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

fn wait_until(probe: &MockProbe, cond: impl Fn(&MockProbe) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond(probe) {
        assert!(Instant::now() < deadline, "probe condition not reached");
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_new_keyboard_is_grabbed_and_reports_flow() {
    // Arrange
    let mut h = Harness::new();
    let identity = DeviceIdentity::new("/dev/input/event3", "K380 Keyboard");
    let probe = h
        .enumerator
        .add_device(identity.clone(), KEYBOARD, vec![ScriptStep::key(KEY_A, 1)]);

    // Act
    let report = h.supervisor.tick();
    let captured = h.keyboard_rx.blocking_recv().expect("report from handler");

    // Assert
    assert_eq!(report.started, 1);
    assert!(h.supervisor.is_tracking(&identity));
    assert!(probe.is_grabbed());
    match captured.report {
        Report::Keyboard(k) => assert_eq!(k.to_bytes(), [0, 0, 4, 0, 0, 0, 0, 0]),
        other => panic!("expected keyboard report, got {other:?}"),
    }
}

#[test]
fn test_keys_and_motion_device_is_captured_as_mouse() {
    let mut h = Harness::new();
    h.enumerator.add_device(
        DeviceIdentity::new("/dev/input/event4", "MX Master"),
        MOUSE,
        vec![ScriptStep::key(0x110, 1)],
    );

    h.supervisor.tick();
    let captured = h.mouse_rx.blocking_recv().expect("report from handler");

    assert!(matches!(captured.report, Report::Mouse(_)));
    assert!(h.keyboard_rx.try_recv().is_err());
}

#[test]
fn test_read_failure_is_reaped_and_other_devices_keep_running() {
    // Arrange: one healthy keyboard, one that fails on its first read.
    let mut h = Harness::new();
    let healthy = DeviceIdentity::new("/dev/input/event3", "K380 Keyboard");
    let broken = DeviceIdentity::new("/dev/input/event5", "Flaky Pad");
    h.enumerator.add_device(healthy.clone(), KEYBOARD, vec![]);
    let broken_probe = h.enumerator.add_device(
        broken.clone(),
        KEYBOARD,
        vec![ScriptStep::Fail(io::ErrorKind::NotConnected)],
    );

    // Act: unplug the broken device once its handler has failed.
    let first = h.supervisor.tick();
    wait_until(&broken_probe, MockProbe::was_released);
    h.enumerator.remove_device(&broken);
    if first.finished == 0 {
        h.tick_until(|t| t.finished >= 1);
    }

    // Assert
    assert!(!h.supervisor.is_tracking(&broken));
    assert!(h.supervisor.is_tracking(&healthy));
}

#[test]
fn test_disconnect_notice_cancels_matching_handler_only() {
    // Arrange
    let mut h = Harness::new();
    let bt = DeviceIdentity::new("/dev/input/event6", "K380 Keyboard Consumer Control");
    let wired = DeviceIdentity::new("/dev/input/event2", "USB Keyboard");
    let bt_probe = h.enumerator.add_device(bt.clone(), KEYBOARD, vec![]);
    let wired_probe = h.enumerator.add_device(wired.clone(), KEYBOARD, vec![]);
    h.supervisor.tick();

    // Act
    h.notices
        .try_send(DisconnectNotice {
            name: "K380 Keyboard".to_string(),
        })
        .expect("notice queued");
    let cancel_tick = h.supervisor.tick();
    wait_until(&bt_probe, MockProbe::was_released);
    h.enumerator.remove_device(&bt);
    if cancel_tick.finished == 0 {
        h.tick_until(|t| t.finished >= 1);
    }

    // Assert
    assert_eq!(cancel_tick.cancelled, 1);
    assert!(!h.supervisor.is_tracking(&bt));
    assert!(h.supervisor.is_tracking(&wired));
    assert!(wired_probe.is_grabbed());
}

#[test]
fn test_busy_device_is_retried_on_next_tick() {
    // Arrange
    let mut h = Harness::new();
    let identity = DeviceIdentity::new("/dev/input/event3", "K380 Keyboard");
    h.enumerator.add_busy_device(identity.clone(), KEYBOARD);

    // Act: the first handler fails its grab, is reaped, then started again.
    let total = h.tick_until(|t| t.finished >= 1 && t.started >= 2);

    // Assert
    assert!(total.started >= 2);
    let opened = h.enumerator.opened();
    assert!(opened.len() >= 2);
    assert!(opened.iter().all(|id| id == &identity));
}

#[test]
fn test_dead_keyboard_writer_stops_regrabbing_keyboards() {
    // Arrange: the keyboard writer is gone; the device would report on every read.
    let mut h = Harness::new();
    let identity = DeviceIdentity::new("/dev/input/event3", "K380 Keyboard");
    let script: Vec<_> = (0..4).map(|i| ScriptStep::key(KEY_A + i, 1)).collect();
    h.enumerator.add_device(identity.clone(), KEYBOARD, script);
    drop(h.keyboard_rx);

    // Act
    let started: usize = (0..10)
        .map(|_| {
            let report = h.supervisor.tick();
            std::thread::sleep(Duration::from_millis(10));
            report.started
        })
        .sum();

    // Assert
    assert_eq!(started, 0);
    assert!(h.enumerator.opened().is_empty());
    assert!(!h.supervisor.is_tracking(&identity));
}

#[test]
fn test_enumeration_failure_then_recovery() {
    let mut h = Harness::new();
    h.enumerator.add_device(
        DeviceIdentity::new("/dev/input/event3", "K380 Keyboard"),
        KEYBOARD,
        vec![],
    );
    h.enumerator.fail_enumeration(true);

    let failed = h.supervisor.tick();
    h.enumerator.fail_enumeration(false);
    let recovered = h.supervisor.tick();

    assert_eq!(failed.started, 0);
    assert_eq!(recovered.started, 1);
    assert_eq!(h.supervisor.handler_count(), 1);
}

#[tokio::test]
async fn test_run_stops_on_shutdown_signal() {
    let h = Harness::new();

    tokio::time::timeout(Duration::from_secs(5), h.supervisor.run(async {}))
        .await
        .expect("supervisor returns once shutdown resolves");
}
