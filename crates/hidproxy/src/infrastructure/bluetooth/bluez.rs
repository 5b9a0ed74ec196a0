//! BlueZ adapter over the system D-Bus.
//!
//! BlueZ publishes one object per adapter (`/org/bluez/hci0`) and one per
//! known device (`/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF`).  A single
//! `GetManagedObjects` call on the root object manager returns all of them
//! with their properties, which is cheaper than introspecting each device.

use async_trait::async_trait;
use tracing::trace;
use zbus::fdo::ObjectManagerProxy;
use zbus::zvariant::OwnedValue;
use zbus::Connection;

use super::{AdapterError, BluetoothAdapter, BluetoothDevice};

const BLUEZ_SERVICE: &str = "org.bluez";
const ADAPTER_INTERFACE: &str = "org.bluez.Adapter1";
const DEVICE_INTERFACE: &str = "org.bluez.Device1";
const UNNAMED_DEVICE: &str = "?";

/// Queries one BlueZ adapter (e.g. `hci0`).
#[derive(Debug, Clone)]
pub struct BluezAdapter {
    connection: Connection,
    adapter_path: String,
}

impl BluezAdapter {
    /// Connects to the system bus.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Bus`] if the system bus is unreachable.
    pub async fn connect(adapter_id: &str) -> Result<Self, AdapterError> {
        let connection = Connection::system().await?;
        Ok(Self {
            connection,
            adapter_path: format!("/org/bluez/{adapter_id}"),
        })
    }
}

#[async_trait]
impl BluetoothAdapter for BluezAdapter {
    async fn devices(&self) -> Result<Vec<BluetoothDevice>, AdapterError> {
        let manager = ObjectManagerProxy::builder(&self.connection)
            .destination(BLUEZ_SERVICE)?
            .path("/")?
            .build()
            .await?;
        let objects = manager.get_managed_objects().await?;

        let adapter_present = objects.iter().any(|(path, interfaces)| {
            path.as_str() == self.adapter_path
                && interfaces.keys().any(|name| name.as_str() == ADAPTER_INTERFACE)
        });
        if !adapter_present {
            return Err(AdapterError::AdapterNotFound(self.adapter_path.clone()));
        }

        let prefix = format!("{}/", self.adapter_path);
        let mut devices = Vec::new();
        for (path, interfaces) in &objects {
            if !path.as_str().starts_with(&prefix) {
                continue;
            }
            let Some(props) = interfaces
                .iter()
                .find(|(name, _)| name.as_str() == DEVICE_INTERFACE)
                .map(|(_, props)| props)
            else {
                continue;
            };

            let name = string_prop(props.get("Name"))
                .or_else(|| string_prop(props.get("Alias")))
                .unwrap_or_else(|| UNNAMED_DEVICE.to_string());
            let (Some(address), Some(connected)) =
                (string_prop(props.get("Address")), bool_prop(props.get("Connected")))
            else {
                trace!("skipping {} without Address/Connected", path.as_str());
                continue;
            };
            devices.push(BluetoothDevice {
                name,
                address,
                connected,
            });
        }
        Ok(devices)
    }
}

fn string_prop(value: Option<&OwnedValue>) -> Option<String> {
    value?.downcast_ref::<&str>().ok().map(str::to_owned)
}

fn bool_prop(value: Option<&OwnedValue>) -> Option<bool> {
    value?.downcast_ref::<bool>().ok()
}
