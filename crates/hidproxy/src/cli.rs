//! Command-line flags.
//!
//! Every flag is optional.  A flag that is given overrides the matching value
//! from the configuration file; one that is absent leaves it alone.  Boolean
//! flags accept `--mouse`, `--mouse=true` and `--mouse=false`.
//!
//! # Usage
//!
//! ```text
//! hidproxy [OPTIONS]
//!
//! Options:
//!   --config <PATH>            TOML configuration file [default: /etc/hidproxy.toml]
//!   --loglevel <LEVEL>         panic|fatal|error|warn|info|debug|trace
//!   --setuphid[=<BOOL>]        Provision the USB gadget at startup
//!   --mouse[=<BOOL>]           Capture mice
//!   --keyboard[=<BOOL>]        Capture keyboards
//!   --monitor-udev[=<BOOL>]    Cancel handlers of disconnected Bluetooth devices
//!   --bluez-adapter <ID>       Bluetooth adapter to query (e.g. hci0)
//!   --kbdrepeat <MS>           Hardware key-repeat period
//!   --kbddelay <MS>            Hardware key-repeat delay
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::infrastructure::storage::config::{LogLevel, ProxyConfig};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/hidproxy.toml";

/// Forwards Bluetooth keyboards and mice to a USB host as a wired HID device.
#[derive(Debug, Parser)]
#[command(name = "hidproxy", version, about)]
pub struct Cli {
    /// TOML configuration file.  A missing file means "all defaults".
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log verbosity.  `RUST_LOG`, when set, takes precedence.
    #[arg(long, value_enum)]
    pub loglevel: Option<LogLevel>,

    /// Provision the USB gadget through configfs before starting.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub setuphid: Option<bool>,

    /// Capture mouse-like devices.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub mouse: Option<bool>,

    /// Capture keyboard-like devices.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub keyboard: Option<bool>,

    /// Watch udev for Bluetooth events and cancel handlers of devices that
    /// disconnected.
    #[arg(long = "monitor-udev", num_args = 0..=1, default_missing_value = "true")]
    pub monitor_udev: Option<bool>,

    /// Bluetooth adapter identifier.
    #[arg(long = "bluez-adapter", value_name = "ID")]
    pub bluez_adapter: Option<String>,

    /// Hardware key-repeat period in milliseconds.
    #[arg(long, value_name = "MS")]
    pub kbdrepeat: Option<u64>,

    /// Hardware key-repeat delay in milliseconds.
    #[arg(long, value_name = "MS")]
    pub kbddelay: Option<u64>,
}

impl Cli {
    /// Overrides `config` with every flag that was given.
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(level) = self.loglevel {
            config.log_level = level;
        }
        if let Some(setup) = self.setuphid {
            config.gadget.setup = setup;
        }
        if let Some(mouse) = self.mouse {
            config.capture.mouse = mouse;
        }
        if let Some(keyboard) = self.keyboard {
            config.capture.keyboard = keyboard;
        }
        if let Some(monitor) = self.monitor_udev {
            config.bluetooth.monitor = monitor;
        }
        if let Some(adapter) = &self.bluez_adapter {
            config.bluetooth.adapter = adapter.clone();
        }
        if let Some(repeat) = self.kbdrepeat {
            config.capture.kbd_repeat = repeat;
        }
        if let Some(delay) = self.kbddelay {
            config.capture.kbd_delay = delay;
        }
    }
}
