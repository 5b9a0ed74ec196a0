//! udev feed of Bluetooth subsystem events.
//!
//! udev monitor sockets are not `Send`, so the feed runs on its own thread
//! with a single-threaded tokio runtime and talks to the rest of the process
//! only through the supervisor's notice channel.

use std::io;
use std::thread::{self, JoinHandle};

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_udev::{AsyncMonitorSocket, EventType, MonitorBuilder};
use tracing::{error, info, warn};

use crate::application::disconnect::{run_disconnect_monitor, BusEvent};
use crate::application::supervise::DisconnectNotice;
use crate::infrastructure::bluetooth::bluez::BluezAdapter;
use crate::infrastructure::bluetooth::AdapterError;

const BLUETOOTH_SUBSYSTEM: &str = "bluetooth";

/// Error type for starting the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("udev monitor setup failed: {0}")]
    Udev(#[from] io::Error),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl From<EventType> for BusEvent {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Add => BusEvent::Added,
            EventType::Remove => BusEvent::Removed,
            _ => BusEvent::Other,
        }
    }
}

/// Starts the monitor thread for `adapter_id`.
///
/// Setup failures (no udev, no system bus) are logged from the thread and
/// leave the proxy running without disconnect detection.
pub fn spawn_disconnect_monitor(
    adapter_id: String,
    notices: mpsc::Sender<DisconnectNotice>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("bt-monitor".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("failed to start disconnect monitor runtime: {e}");
                    return;
                }
            };
            if let Err(e) = runtime.block_on(monitor(&adapter_id, &notices)) {
                warn!("disconnect monitor disabled: {e}");
            }
        })
}

async fn monitor(
    adapter_id: &str,
    notices: &mpsc::Sender<DisconnectNotice>,
) -> Result<(), MonitorError> {
    let socket = MonitorBuilder::new()?
        .match_subsystem(BLUETOOTH_SUBSYSTEM)?
        .listen()?;
    let events = AsyncMonitorSocket::new(socket)?.filter_map(|event| async move {
        match event {
            Ok(event) => Some(BusEvent::from(event.event_type())),
            Err(e) => {
                warn!("udev monitor read failed: {e}");
                None
            }
        }
    });
    let adapter = BluezAdapter::connect(adapter_id).await?;
    info!("watching Bluetooth adapter {adapter_id} for disconnects");

    run_disconnect_monitor(Box::pin(events), &adapter, notices).await;
    Ok(())
}
