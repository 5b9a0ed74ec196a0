//! Integration tests for the capture → queue → writer pipeline.
//!
//! Scripted input sources feed real capture handlers, which push onto real
//! bounded queues drained by real report writers into recording sinks.  Only
//! the device nodes at both ends are replaced.

use std::time::Duration;

use hidproxy::application::capture::{spawn_handler, HandlerContext, KeyRepeat};
use hidproxy::application::write_reports::spawn_report_writer;
use hidproxy::infrastructure::gadget::mock::RecordingSink;
use hidproxy::infrastructure::input_capture::mock::{MockInputSource, ScriptStep};
use hidproxy_core::domain::mouse_state::{BTN_LEFT, REL_WHEEL, REL_X, REL_Y};
use hidproxy_core::{DeviceIdentity, ReportClass, ScancodeMap};
use tokio::sync::{mpsc, oneshot};

const KEY_A: u16 = 30;
const KEY_B: u16 = 48;
const KEY_LEFTSHIFT: u16 = 42;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn repeat() -> KeyRepeat {
    KeyRepeat {
        delay: Duration::from_millis(300),
        period: Duration::from_millis(62),
    }
}

/// Waits until `sink` holds `n` frames or a generous deadline passes.
fn wait_for_frames(sink: &RecordingSink, n: usize) -> Vec<Vec<u8>> {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        let frames = sink.frames();
        if frames.len() >= n || std::time::Instant::now() > deadline {
            return frames;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

struct RunningHandler {
    cancel: mpsc::Sender<()>,
    outcome: oneshot::Receiver<Result<(), hidproxy::infrastructure::input_capture::CaptureError>>,
    thread: std::thread::JoinHandle<()>,
}

fn start(
    class: ReportClass,
    source: MockInputSource,
    queue: mpsc::Sender<hidproxy_core::CapturedReport>,
) -> RunningHandler {
    let (cancel_tx, cancel_rx) = mpsc::channel(1);
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let ctx = HandlerContext {
        queue,
        cancel: cancel_rx,
        map: ScancodeMap::new(),
        repeat: repeat(),
    };
    let thread = spawn_handler(class, Box::new(source), ctx, outcome_tx).expect("spawn handler");
    RunningHandler {
        cancel: cancel_tx,
        outcome: outcome_rx,
        thread,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_keyboard_shift_a_reaches_gadget_in_order() {
    // Arrange
    let sink = RecordingSink::new();
    let (tx, rx) = mpsc::channel(10);
    let writer = spawn_report_writer(ReportClass::Keyboard, sink.clone(), rx).expect("writer");
    let source = MockInputSource::new(
        DeviceIdentity::new("/dev/input/event3", "K380 Keyboard"),
        vec![
            ScriptStep::key(KEY_LEFTSHIFT, 1),
            ScriptStep::syn(),
            ScriptStep::key(KEY_A, 1),
            ScriptStep::syn(),
            ScriptStep::key(KEY_A, 0),
            ScriptStep::key(KEY_LEFTSHIFT, 0),
        ],
    );
    let probe = source.probe();

    // Act
    let handler = start(ReportClass::Keyboard, source, tx);
    let frames = wait_for_frames(&sink, 4);
    handler.cancel.try_send(()).expect("cancel slot free");
    let outcome = handler.outcome.blocking_recv().expect("outcome delivered");
    handler.thread.join().expect("handler thread");
    writer.join().expect("writer exits once the handler drops its queue");

    // Assert
    assert!(outcome.is_ok());
    assert_eq!(
        frames,
        vec![
            vec![2, 0, 0, 0, 0, 0, 0, 0],
            vec![2, 0, 4, 0, 0, 0, 0, 0],
            vec![2, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0],
        ]
    );
    assert!(probe.was_released());
}

#[test]
fn test_mouse_diagonal_move_yields_one_report_per_axis() {
    // Arrange
    let sink = RecordingSink::new();
    let (tx, rx) = mpsc::channel(100);
    let writer = spawn_report_writer(ReportClass::Mouse, sink.clone(), rx).expect("writer");
    let source = MockInputSource::new(
        DeviceIdentity::new("/dev/input/event4", "MX Master"),
        vec![
            ScriptStep::rel(REL_X, 5),
            ScriptStep::rel(REL_Y, -3),
            ScriptStep::syn(),
            ScriptStep::key(BTN_LEFT, 1),
            ScriptStep::rel(REL_WHEEL, 1),
            ScriptStep::key(BTN_LEFT, 0),
        ],
    );

    // Act
    let handler = start(ReportClass::Mouse, source, tx);
    let frames = wait_for_frames(&sink, 5);
    handler.cancel.try_send(()).expect("cancel slot free");
    handler.thread.join().expect("handler thread");
    writer.join().expect("writer thread");

    // Assert
    assert_eq!(
        frames,
        vec![
            vec![0, 5, 0, 0],
            vec![0, 0, 0xfd, 0],
            vec![1, 0, 0, 0],
            vec![1, 0, 0, 1],
            vec![0, 0, 0, 0],
        ]
    );
}

#[test]
fn test_two_keyboards_share_one_queue() {
    // Arrange
    let sink = RecordingSink::new();
    let (tx, rx) = mpsc::channel(10);
    let writer = spawn_report_writer(ReportClass::Keyboard, sink.clone(), rx).expect("writer");
    let first = MockInputSource::new(
        DeviceIdentity::new("/dev/input/event3", "K380 Keyboard"),
        vec![ScriptStep::key(KEY_A, 1), ScriptStep::key(KEY_A, 0)],
    );
    let second = MockInputSource::new(
        DeviceIdentity::new("/dev/input/event5", "Numpad"),
        vec![ScriptStep::key(KEY_B, 1), ScriptStep::key(KEY_B, 0)],
    );

    // Act
    let h1 = start(ReportClass::Keyboard, first, tx.clone());
    let h2 = start(ReportClass::Keyboard, second, tx);
    let frames = wait_for_frames(&sink, 4);
    for h in [h1, h2] {
        h.cancel.try_send(()).expect("cancel slot free");
        h.thread.join().expect("handler thread");
    }
    writer.join().expect("writer thread");

    // Assert: each handler's own reports stay in order.
    assert_eq!(frames.len(), 4);
    let a_frames: Vec<_> = frames.iter().filter(|f| f[2] == 4).collect();
    let a_pos = frames.iter().position(|f| f[2] == 4).expect("a down");
    let b_pos = frames.iter().position(|f| f[2] == 5).expect("b down");
    assert_eq!(a_frames.len(), 1);
    assert!(frames[a_pos + 1..].iter().any(|f| f.iter().all(|&b| b == 0)));
    assert!(frames[b_pos + 1..].iter().any(|f| f.iter().all(|&b| b == 0)));
}

#[test]
fn test_dead_writer_stops_handler_with_queue_closed() {
    // Arrange: the sink rejects the very first frame.
    let sink = RecordingSink::failing_after(0);
    let (tx, rx) = mpsc::channel(1);
    let writer = spawn_report_writer(ReportClass::Keyboard, sink.clone(), rx).expect("writer");
    let script: Vec<_> = (0..20)
        .flat_map(|_| [ScriptStep::key(KEY_A, 1), ScriptStep::key(KEY_A, 0)])
        .collect();
    let source = MockInputSource::new(DeviceIdentity::new("/dev/input/event3", "K380 Keyboard"), script);
    let probe = source.probe();

    // Act
    let handler = start(ReportClass::Keyboard, source, tx);
    writer.join().expect("writer thread");
    let outcome = handler.outcome.blocking_recv().expect("outcome delivered");

    // Assert
    assert!(matches!(
        outcome,
        Err(hidproxy::infrastructure::input_capture::CaptureError::QueueClosed(ReportClass::Keyboard))
    ));
    assert!(sink.frames().is_empty());
    assert!(probe.was_released());
}

#[test]
fn test_full_queue_blocks_handler_without_dropping_reports() {
    // Arrange: a two-slot queue whose writer has not started yet.
    let (tx, rx) = mpsc::channel(2);
    let script: Vec<_> = (0..10)
        .flat_map(|_| [ScriptStep::key(KEY_A, 1), ScriptStep::key(KEY_A, 0)])
        .collect();
    let source = MockInputSource::new(DeviceIdentity::new("/dev/input/event3", "K380 Keyboard"), script);
    let probe = source.probe();

    // Act: let the handler fill the queue, then start draining it.
    let handler = start(ReportClass::Keyboard, source, tx);
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while probe.events_read() < 3 {
        assert!(std::time::Instant::now() < deadline, "handler never filled the queue");
        std::thread::sleep(Duration::from_millis(5));
    }
    std::thread::sleep(Duration::from_millis(100));
    let read_while_full = probe.events_read();

    let sink = RecordingSink::new();
    let writer = spawn_report_writer(ReportClass::Keyboard, sink.clone(), rx).expect("writer");
    let frames = wait_for_frames(&sink, 20);
    handler.cancel.try_send(()).expect("cancel slot free");
    handler.thread.join().expect("handler thread");
    writer.join().expect("writer thread");

    // Assert: two queued, one held by the blocked send, nothing lost.
    assert_eq!(read_while_full, 3);
    assert_eq!(frames.len(), 20);
    for (i, frame) in frames.iter().enumerate() {
        let expected_key = if i % 2 == 0 { 4 } else { 0 };
        assert_eq!(frame, &vec![0, 0, expected_key, 0, 0, 0, 0, 0], "frame {i}");
    }
}
