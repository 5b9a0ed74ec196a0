//! Infrastructure layer for the proxy.
//!
//! Contains OS-facing adapters: evdev input capture, the USB gadget (configfs
//! provisioning and hidg report sinks), BlueZ queries over D-Bus, the udev
//! event feed, and configuration file loading.
//!
//! **Dependency rule**: the `application` layer sees these adapters through
//! the traits they implement (`InputSource`, `DeviceEnumerator`,
//! `ReportSink`, `BluetoothAdapter`); only `main` picks the concrete types.

pub mod bluetooth;
pub mod gadget;
pub mod input_capture;
pub mod storage;
pub mod udev_monitor;
