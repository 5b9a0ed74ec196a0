//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads the optional TOML configuration file and
//! supplies defaults for every knob that is absent, so the proxy runs with no
//! file at all.  Command-line flags are layered on top by [`crate::cli`].

pub mod config;
