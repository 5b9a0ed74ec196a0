//! Domain entities for hidproxy.
//!
//! This module contains pure state-tracking logic with no infrastructure
//! dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from OS APIs, device nodes, D-Bus, or async runtimes.
//! - Can be compiled and tested on any platform without any external setup.
//! - Defines the data types and operations that make the system uniquely what it
//!   is: here, remembering which keys and buttons are held so every HID
//!   report sent downstream reflects the true state of the physical device.
//!
//! Code in outer layers (capture handlers, writers, the supervisor) depends on
//! the domain, but the domain never depends on them.

/// Input device identity and capability-based classification.
pub mod device;

/// Per-keyboard set of held keys and the report derived from it.
pub mod key_state;

/// Rolling capture-to-write latency statistics kept by each report writer.
pub mod latency;

/// Per-mouse button bitmask and per-event motion encoding.
pub mod mouse_state;
