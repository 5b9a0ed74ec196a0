//! DeviceSupervisor: owns the lifecycle of every capture handler.
//!
//! Once per [`TICK_INTERVAL`] the supervisor:
//!
//! 1. drains pending disconnect notices and asks matching handlers to stop,
//! 2. enumerates input devices and starts a handler for each new one,
//! 3. polls every handler's outcome and forgets the ones that finished.
//!
//! A tick enumerates and opens devices, which blocks, so [`DeviceSupervisor::run`]
//! performs each tick on tokio's blocking pool.
//!
//! Once a writer is gone its class is undeliverable: the supervisor logs that
//! once and stops grabbing devices of that class.
//!
//! The handler map is touched only by the supervisor itself.  Handlers and
//! the disconnect monitor talk to it exclusively through channels, and every
//! channel operation here is non-blocking, so a stuck handler can never stall
//! the loop.

use std::collections::HashMap;
use std::time::Duration;

use hidproxy_core::{CapturedReport, DeviceIdentity, ReportClass, ScancodeMap};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::capture::{spawn_handler, HandlerContext, KeyRepeat};
use crate::infrastructure::input_capture::{CaptureError, DeviceEnumerator};

/// Period of the supervisor loop.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A request to stop capturing devices that belong to a Bluetooth device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectNotice {
    /// The Bluetooth device's friendly name.
    pub name: String,
}

/// Supervisor policy, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOptions {
    pub keyboard: bool,
    pub mouse: bool,
    pub repeat: KeyRepeat,
}

/// Per-class report queues handed to new handlers.  `None` for disabled classes.
#[derive(Debug, Clone, Default)]
pub struct ReportQueues {
    pub keyboard: Option<mpsc::Sender<CapturedReport>>,
    pub mouse: Option<mpsc::Sender<CapturedReport>>,
}

impl ReportQueues {
    fn for_class(&self, class: ReportClass) -> Option<&mpsc::Sender<CapturedReport>> {
        match class {
            ReportClass::Keyboard => self.keyboard.as_ref(),
            ReportClass::Mouse => self.mouse.as_ref(),
        }
    }

    fn take(&mut self, class: ReportClass) -> Option<mpsc::Sender<CapturedReport>> {
        match class {
            ReportClass::Keyboard => self.keyboard.take(),
            ReportClass::Mouse => self.mouse.take(),
        }
    }
}

/// What a single tick did; mostly useful for tests and debug logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub cancelled: usize,
    pub started: usize,
    pub finished: usize,
}

struct HandlerRecord {
    class: ReportClass,
    outcome: oneshot::Receiver<Result<(), CaptureError>>,
    cancel: mpsc::Sender<()>,
}

/// Owns the handler map and runs the periodic control loop.
pub struct DeviceSupervisor<E: DeviceEnumerator> {
    enumerator: E,
    options: SupervisorOptions,
    queues: ReportQueues,
    notices: mpsc::Receiver<DisconnectNotice>,
    map: ScancodeMap,
    handlers: HashMap<DeviceIdentity, HandlerRecord>,
}

impl<E: DeviceEnumerator> DeviceSupervisor<E> {
    pub fn new(
        enumerator: E,
        options: SupervisorOptions,
        queues: ReportQueues,
        notices: mpsc::Receiver<DisconnectNotice>,
    ) -> Self {
        Self {
            enumerator,
            options,
            queues,
            notices,
            map: ScancodeMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Number of handlers currently tracked.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if a handler for `identity` is tracked.
    pub fn is_tracking(&self, identity: &DeviceIdentity) -> bool {
        self.handlers.contains_key(identity)
    }

    /// Runs one iteration of the control loop without sleeping.
    pub fn tick(&mut self) -> TickReport {
        let cancelled = self.drain_notices();
        let started = self.start_new_handlers();
        let finished = self.reap_finished();
        let report = TickReport {
            cancelled,
            started,
            finished,
        };
        if report != TickReport::default() {
            debug!(?report, tracked = self.handlers.len(), "supervisor tick");
        }
        report
    }

    /// Ticks every [`TICK_INTERVAL`] until `shutdown` resolves.
    ///
    /// Each tick runs on the blocking pool; the supervisor moves there and back.
    /// Running handlers are not stopped; their threads end with the process.
    pub async fn run<F>(mut self, shutdown: F)
    where
        E: 'static,
        F: std::future::Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            self = match tokio::task::spawn_blocking(move || {
                self.tick();
                self
            })
            .await
            {
                Ok(supervisor) => supervisor,
                Err(e) => {
                    error!(fatal = true, "supervisor tick panicked: {e}");
                    return;
                }
            };
            tokio::select! {
                _ = &mut shutdown => {
                    info!("supervisor stopping with {} handler(s) still running", self.handlers.len());
                    return;
                }
                _ = tokio::time::sleep(TICK_INTERVAL) => {}
            }
        }
    }

    // ── Tick steps ────────────────────────────────────────────────────────────

    fn drain_notices(&mut self) -> usize {
        let mut cancelled = 0;
        while let Ok(notice) = self.notices.try_recv() {
            for (identity, record) in &self.handlers {
                if !identity.matches_bluetooth_name(&notice.name) {
                    continue;
                }
                match record.cancel.try_send(()) {
                    Ok(()) => {
                        info!("{} disconnected; cancelling handler for {identity}", notice.name);
                        cancelled += 1;
                    }
                    // Already asked, or the handler is gone and about to be reaped.
                    Err(TrySendError::Full(())) | Err(TrySendError::Closed(())) => {}
                }
            }
        }
        cancelled
    }

    fn start_new_handlers(&mut self) -> usize {
        let devices = match self.enumerator.enumerate() {
            Ok(devices) => devices,
            Err(e) => {
                warn!("{e}");
                return 0;
            }
        };

        let mut started = 0;
        for device in devices {
            if self.handlers.contains_key(&device.identity) {
                continue;
            }
            let Some(class) = device.capabilities.classify() else {
                continue;
            };
            if !self.class_enabled(class) {
                continue;
            }
            let Some(queue) = self.live_queue(class) else {
                continue;
            };
            if self.start_handler(device.identity, class, queue) {
                started += 1;
            }
        }
        started
    }

    fn start_handler(
        &mut self,
        identity: DeviceIdentity,
        class: ReportClass,
        queue: mpsc::Sender<CapturedReport>,
    ) -> bool {
        let source = match self.enumerator.open(&identity) {
            Ok(source) => source,
            Err(e) => {
                warn!("{e}");
                return false;
            }
        };
        let (cancel_tx, cancel_rx) = mpsc::channel(1);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let ctx = HandlerContext {
            queue,
            cancel: cancel_rx,
            map: self.map,
            repeat: self.options.repeat,
        };
        if let Err(e) = spawn_handler(class, source, ctx, outcome_tx) {
            error!("failed to spawn {class} handler for {identity}: {e}");
            return false;
        }
        debug!("started {class} handler for {identity}");
        self.handlers.insert(
            identity,
            HandlerRecord {
                class,
                outcome: outcome_rx,
                cancel: cancel_tx,
            },
        );
        true
    }

    fn reap_finished(&mut self) -> usize {
        let before = self.handlers.len();
        self.handlers.retain(|identity, record| {
            let outcome = match record.outcome.try_recv() {
                Err(TryRecvError::Empty) => return true,
                Ok(outcome) => outcome,
                Err(TryRecvError::Closed) => Err(CaptureError::Read {
                    device: identity.to_string(),
                    source: std::io::Error::other("handler exited without reporting"),
                }),
            };
            match outcome {
                Ok(()) => warn!("{} handler for {identity} stopped", record.class),
                Err(e) => error!(fatal = true, "{} handler for {identity} failed: {e}", record.class),
            }
            false
        });
        before - self.handlers.len()
    }

    /// The class's queue, or `None` once its writer has hung up.
    fn live_queue(&mut self, class: ReportClass) -> Option<mpsc::Sender<CapturedReport>> {
        let queue = self.queues.for_class(class)?;
        if !queue.is_closed() {
            return Some(queue.clone());
        }
        self.queues.take(class);
        error!(
            fatal = true,
            "{class} writer is gone; {class} devices will no longer be captured"
        );
        None
    }

    fn class_enabled(&self, class: ReportClass) -> bool {
        match class {
            ReportClass::Keyboard => self.options.keyboard,
            ReportClass::Mouse => self.options.mouse,
        }
    }
}
