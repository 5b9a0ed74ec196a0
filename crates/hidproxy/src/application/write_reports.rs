//! Report writers: one per report class.
//!
//! A writer owns the receiving half of its class's bounded queue and the
//! gadget sink for that class.  It dequeues reports in FIFO order, writes each
//! one as a single frame, and tracks how long reports waited between capture
//! and write.
//!
//! A write failure ends the writer for good: gadget nodes usually vanish
//! because the whole gadget went away, and nothing short of re-provisioning
//! brings them back.  The failure is logged as fatal so an operator notices
//! that one report class is no longer delivered.

use std::thread::{self, JoinHandle};

use hidproxy_core::{CapturedReport, LatencyStats, ReportClass, MAX_REPORT_SIZE};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::infrastructure::gadget::writer::{ReportSink, WriteError};

/// Writes between two keyboard latency summaries.
pub const KEYBOARD_SUMMARY_EVERY: u64 = 50;

/// Writes between two mouse latency summaries.
pub const MOUSE_SUMMARY_EVERY: u64 = 100;

fn summary_interval(class: ReportClass) -> u64 {
    match class {
        ReportClass::Keyboard => KEYBOARD_SUMMARY_EVERY,
        ReportClass::Mouse => MOUSE_SUMMARY_EVERY,
    }
}

/// Drains `queue` into `sink` until every producer has hung up.
///
/// Returns the final latency statistics.
///
/// # Errors
///
/// Returns the first [`WriteError`] from the sink; the writer stops there.
pub fn run_report_writer<S: ReportSink>(
    class: ReportClass,
    mut sink: S,
    mut queue: mpsc::Receiver<CapturedReport>,
) -> Result<LatencyStats, WriteError> {
    let mut stats = LatencyStats::new();
    let every = summary_interval(class);
    let mut frame = [0u8; MAX_REPORT_SIZE];

    while let Some(captured) = queue.blocking_recv() {
        if captured.report.class() != class {
            warn!(
                "dropping {} report queued for the {class} writer",
                captured.report.class()
            );
            continue;
        }
        let len = captured.report.serialize(&mut frame)?;
        sink.write_report(&frame[..len])?;
        stats.record(captured.age());
        debug!("{class} report {:?} written, latency {:?}", &frame[..len], stats.last());

        if stats.is_summary_due(every) {
            debug!("{class} latency: {stats}");
        }
    }
    info!("{class} queue closed; writer for {} exiting", sink.describe());
    Ok(stats)
}

/// Runs a writer on a named thread and logs its death at fatal severity.
pub fn spawn_report_writer<S: ReportSink + 'static>(
    class: ReportClass,
    sink: S,
    queue: mpsc::Receiver<CapturedReport>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{class}-writer"))
        .spawn(move || {
            let target = sink.describe();
            if let Err(e) = run_report_writer(class, sink, queue) {
                error!(
                    fatal = true,
                    "{class} writer for {target} died, no further {class} reports will be delivered: {e}"
                );
            }
        })
}
