//! Bluetooth adapter queries.
//!
//! The proxy only needs one question answered: "which paired devices are
//! currently *not* connected?"  When a Bluetooth keyboard drops its link the
//! kernel may keep the evdev node open for a while; the disconnect monitor
//! uses the answer to cancel the capture handlers of those devices by name.
//!
//! [`BluetoothAdapter`] is the seam.  [`bluez::BluezAdapter`] answers over the
//! system D-Bus; tests use the `mockall`-generated `MockBluetoothAdapter`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

pub mod bluez;

/// Error type for adapter queries.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("D-Bus error: {0}")]
    Bus(#[from] zbus::Error),
    #[error("BlueZ object manager query failed: {0}")]
    ObjectManager(#[from] zbus::fdo::Error),
    #[error("Bluetooth adapter {0} not found")]
    AdapterNotFound(String),
}

/// A device known to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BluetoothDevice {
    /// Friendly name (BlueZ `Name`, falling back to `Alias`).
    pub name: String,
    pub address: String,
    pub connected: bool,
}

impl BluetoothDevice {
    pub fn new(name: impl Into<String>, address: impl Into<String>, connected: bool) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            connected,
        }
    }
}

/// Read access to the devices paired with one adapter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BluetoothAdapter: Send + Sync {
    /// Every device the adapter knows about, connected or not.
    async fn devices(&self) -> Result<Vec<BluetoothDevice>, AdapterError>;
}

/// Names of devices that are disconnected, deduplicated and sorted.
///
/// A name also carried by a connected device is left out: two controllers
/// with the same product name must not cancel each other.
pub fn disconnected_names(devices: &[BluetoothDevice]) -> Vec<String> {
    let connected: BTreeSet<&str> = devices
        .iter()
        .filter(|d| d.connected)
        .map(|d| d.name.as_str())
        .collect();
    let disconnected: BTreeSet<&str> = devices
        .iter()
        .filter(|d| !d.connected && !connected.contains(d.name.as_str()))
        .map(|d| d.name.as_str())
        .collect();
    disconnected.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_names_filters_connected() {
        // Arrange
        let devices = vec![
            BluetoothDevice::new("K380 Keyboard", "AA:BB:CC:DD:EE:01", false),
            BluetoothDevice::new("MX Master", "AA:BB:CC:DD:EE:02", true),
        ];

        // Act
        let names = disconnected_names(&devices);

        // Assert
        assert_eq!(names, vec!["K380 Keyboard".to_string()]);
    }

    #[test]
    fn test_disconnected_names_deduplicates() {
        let devices = vec![
            BluetoothDevice::new("Pad", "AA:BB:CC:DD:EE:01", false),
            BluetoothDevice::new("Pad", "AA:BB:CC:DD:EE:02", false),
        ];

        assert_eq!(disconnected_names(&devices), vec!["Pad".to_string()]);
    }

    #[test]
    fn test_disconnected_names_skips_name_shared_with_connected_device() {
        let devices = vec![
            BluetoothDevice::new("Pad", "AA:BB:CC:DD:EE:01", false),
            BluetoothDevice::new("Pad", "AA:BB:CC:DD:EE:02", true),
        ];

        assert!(disconnected_names(&devices).is_empty());
    }

    #[test]
    fn test_disconnected_names_empty_input() {
        assert!(disconnected_names(&[]).is_empty());
    }
}
