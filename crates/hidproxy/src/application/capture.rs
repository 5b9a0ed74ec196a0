//! Capture handlers: one per grabbed input device.
//!
//! A handler exclusively grabs its device, then turns raw evdev events into
//! boot-protocol reports and pushes them onto its class's report queue:
//!
//! ```text
//! Idle ──grab──▶ Grabbed ──configure──▶ Streaming ──cancel/error──▶ Stopped
//! ```
//!
//! Handlers run on dedicated OS threads because every device call blocks.
//! Reads are bounded by [`READ_TIMEOUT`] so the thread regains control to
//! look for a cancellation request even when the device is idle.
//!
//! # Cancellation (for beginners)
//!
//! Cancellation is cooperative.  The supervisor holds the sending half of a
//! one-slot channel and `try_send`s a unit value; the handler polls the
//! receiving half with `try_recv` every [`CANCEL_CHECK_INTERVAL`] processed
//! events and after every read timeout.  Once a request is seen the handler
//! releases the grab and returns without enqueuing anything further.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use hidproxy_core::{
    CapturedReport, DeviceIdentity, KeyOutcome, KeyboardTracker, MouseState, Report, ReportClass,
    ScancodeMap,
};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::infrastructure::input_capture::{CaptureError, InputSource, RawInputEvent};

/// Upper bound on a single blocking read.
pub const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Processed events between two cancellation checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 4;

/// Hardware key-repeat settings applied to keyboards after grabbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRepeat {
    pub delay: Duration,
    pub period: Duration,
}

/// Everything a handler needs besides its device.
pub struct HandlerContext {
    pub queue: mpsc::Sender<CapturedReport>,
    pub cancel: mpsc::Receiver<()>,
    pub map: ScancodeMap,
    pub repeat: KeyRepeat,
}

/// Captures a keyboard until cancelled or a read fails.
///
/// # Errors
///
/// Returns [`CaptureError::Grab`] if the device is held elsewhere,
/// [`CaptureError::Read`] on any read failure other than a timeout, and
/// [`CaptureError::QueueClosed`] if the keyboard writer has gone away.
pub fn run_keyboard_handler(
    source: &mut dyn InputSource,
    map: ScancodeMap,
    repeat: KeyRepeat,
    queue: &mpsc::Sender<CapturedReport>,
    cancel: &mut mpsc::Receiver<()>,
) -> Result<(), CaptureError> {
    source.grab()?;
    info!("Grabbed keyboard-like device {}", source.identity());
    configure_best_effort(source.set_nonblocking());
    configure_best_effort(source.set_key_repeat(repeat.delay, repeat.period));

    let mut tracker = KeyboardTracker::new(map);
    let result = stream(source, ReportClass::Keyboard, queue, cancel, |event, device| {
        let RawInputEvent::Key { code, value } = event else {
            return None;
        };
        match tracker.handle(code, value) {
            KeyOutcome::Report(report) => Some(Report::Keyboard(report)),
            KeyOutcome::Unknown(scancode) => {
                warn!("unknown scancode {scancode} from {device}");
                None
            }
            KeyOutcome::Ignored => None,
        }
    });
    source.release();
    result
}

/// Captures a mouse until cancelled or a read fails.
///
/// # Errors
///
/// Same as [`run_keyboard_handler`].
pub fn run_mouse_handler(
    source: &mut dyn InputSource,
    queue: &mpsc::Sender<CapturedReport>,
    cancel: &mut mpsc::Receiver<()>,
) -> Result<(), CaptureError> {
    source.grab()?;
    info!("Grabbed mouse-like device {}", source.identity());
    configure_best_effort(source.set_nonblocking());

    let mut state = MouseState::new();
    let result = stream(source, ReportClass::Mouse, queue, cancel, |event, _| {
        let report = match event {
            RawInputEvent::Key { code, value } => state.handle_key(code, value),
            RawInputEvent::Relative { code, value } => state.handle_rel(code, value),
            RawInputEvent::Other { .. } => None,
        };
        report.map(Report::Mouse)
    });
    source.release();
    result
}

/// Spawns a handler for `class` on a named thread.
///
/// The handler's result is delivered exactly once on `outcome`, after the
/// device has been released.
pub fn spawn_handler(
    class: ReportClass,
    mut source: Box<dyn InputSource>,
    mut ctx: HandlerContext,
    outcome: oneshot::Sender<Result<(), CaptureError>>,
) -> std::io::Result<JoinHandle<()>> {
    let name = format!("{class}-{}", source.identity().name);
    thread::Builder::new().name(name).spawn(move || {
        let result = match class {
            ReportClass::Keyboard => run_keyboard_handler(
                source.as_mut(),
                ctx.map,
                ctx.repeat,
                &ctx.queue,
                &mut ctx.cancel,
            ),
            ReportClass::Mouse => run_mouse_handler(source.as_mut(), &ctx.queue, &mut ctx.cancel),
        };
        // The supervisor may already have forgotten this handler.
        let _ = outcome.send(result);
    })
}

// ── Streaming loop ────────────────────────────────────────────────────────────

fn stream<F>(
    source: &mut dyn InputSource,
    class: ReportClass,
    queue: &mpsc::Sender<CapturedReport>,
    cancel: &mut mpsc::Receiver<()>,
    mut translate: F,
) -> Result<(), CaptureError>
where
    F: FnMut(RawInputEvent, &DeviceIdentity) -> Option<Report>,
{
    let mut processed: u64 = 0;
    loop {
        let Some(event) = source.next_event(READ_TIMEOUT)? else {
            if cancel_requested(cancel) {
                debug!("{class} handler for {} cancelled while idle", source.identity());
                return Ok(());
            }
            continue;
        };
        processed += 1;
        debug!(?event, "{class} event from {}", source.identity());

        if let Some(report) = translate(event, source.identity()) {
            queue
                .blocking_send(CapturedReport::now(report))
                .map_err(|_| CaptureError::QueueClosed(class))?;
        }

        if processed % CANCEL_CHECK_INTERVAL == 0 && cancel_requested(cancel) {
            debug!("{class} handler for {} cancelled", source.identity());
            return Ok(());
        }
    }
}

/// A dropped sender counts as a request: nobody is left to supervise us.
fn cancel_requested(cancel: &mut mpsc::Receiver<()>) -> bool {
    match cancel.try_recv() {
        Ok(()) | Err(TryRecvError::Disconnected) => true,
        Err(TryRecvError::Empty) => false,
    }
}

fn configure_best_effort(result: Result<(), CaptureError>) {
    if let Err(e) = result {
        warn!("{e}; continuing");
    }
}
