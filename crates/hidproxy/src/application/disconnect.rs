//! Disconnect monitor: turns Bluetooth bus activity into cancellation notices.
//!
//! Every add or remove event on the Bluetooth subsystem triggers one query of
//! the adapter.  Devices reported as disconnected become [`DisconnectNotice`]s
//! for the supervisor, which cancels the handlers whose device names match.
//!
//! The event itself is not inspected: udev's view of which device changed is
//! not reliable across kernels, and a full query is cheap.

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

use super::supervise::DisconnectNotice;
use crate::infrastructure::bluetooth::{disconnected_names, BluetoothAdapter};

/// A bus notification, reduced to what the monitor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Added,
    Removed,
    Other,
}

/// Consumes `events` until the stream ends or the supervisor goes away.
///
/// Notices are sent with `try_send`; if the supervisor's inbox is full the
/// notice is dropped and the next bus event will produce it again.
pub async fn run_disconnect_monitor<S, A>(
    mut events: S,
    adapter: &A,
    notices: &mpsc::Sender<DisconnectNotice>,
) where
    S: Stream<Item = BusEvent> + Unpin,
    A: BluetoothAdapter + ?Sized,
{
    while let Some(event) = events.next().await {
        if event == BusEvent::Other {
            continue;
        }
        debug!(?event, "bluetooth bus event");

        let devices = match adapter.devices().await {
            Ok(devices) => devices,
            Err(e) => {
                error!("failed to query Bluetooth devices: {e}");
                continue;
            }
        };

        for name in disconnected_names(&devices) {
            match notices.try_send(DisconnectNotice { name }) {
                Ok(()) => {}
                Err(TrySendError::Full(notice)) => {
                    warn!("supervisor busy; dropping disconnect notice for {}", notice.name);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("supervisor gone; disconnect monitor exiting");
                    return;
                }
            }
        }
    }
}
