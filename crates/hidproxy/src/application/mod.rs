//! Application layer use cases for the proxy.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The *application* layer sits between the core (pure translation and
//! report logic in `hidproxy_core`) and the infrastructure (evdev, configfs,
//! D-Bus).  Use cases here depend on traits rather than concrete devices, so
//! every one of them can be driven by mocks in tests.
//!
//! # Sub-modules
//!
//! - **`capture`** – Keyboard and mouse capture handlers.  Each grabs one
//!   input device and turns its events into reports on a bounded queue.  This
//!   runs on every keystroke and mouse movement.
//!
//! - **`write_reports`** – One writer per report class, draining its queue
//!   into the gadget node and keeping latency statistics.
//!
//! - **`supervise`** – The once-a-second control loop that starts handlers
//!   for new devices and reaps finished ones.
//!
//! - **`disconnect`** – Turns Bluetooth bus activity into cancellation
//!   notices for the supervisor.

pub mod capture;
pub mod disconnect;
pub mod supervise;
pub mod write_reports;
