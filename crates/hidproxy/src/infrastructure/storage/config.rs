//! TOML-based configuration for the proxy.
//!
//! Every setting has a default, so the file is optional.  A typical file:
//!
//! ```toml
//! log_level = "debug"
//!
//! [capture]
//! mouse = false
//! kbd_delay = 250
//!
//! [gadget]
//! setup = false
//! keyboard_device = "/dev/hidg2"
//!
//! [bluetooth]
//! adapter = "hci1"
//! ```
//!
//! # Serde default values (for beginners)
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  Sections
//! marked `#[serde(default)]` fall back to their `Default` impl when the
//! whole table is missing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Log level ─────────────────────────────────────────────────────────────────

/// Verbosity accepted by `--loglevel` and the `log_level` key.
///
/// `panic` and `fatal` exist for compatibility with older launch scripts;
/// both behave like `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The `tracing_subscriber::EnvFilter` directive for this level.
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Panic | LogLevel::Fatal | LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level proxy configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProxyConfig {
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub gadget: GadgetConfig,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
}

/// Which device classes to capture and how.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CaptureConfig {
    #[serde(default = "default_true")]
    pub keyboard: bool,
    #[serde(default = "default_true")]
    pub mouse: bool,
    /// Hardware key-repeat period in milliseconds.
    #[serde(default = "default_kbd_repeat")]
    pub kbd_repeat: u64,
    /// Hardware key-repeat delay in milliseconds.
    #[serde(default = "default_kbd_delay")]
    pub kbd_delay: u64,
    /// Capacity of the keyboard report queue.
    #[serde(default = "default_keyboard_queue")]
    pub keyboard_queue: usize,
    /// Capacity of the mouse report queue.
    #[serde(default = "default_mouse_queue")]
    pub mouse_queue: usize,
}

/// USB gadget provisioning and output nodes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GadgetConfig {
    /// Provision the configfs gadget tree at startup.
    #[serde(default = "default_true")]
    pub setup: bool,
    #[serde(default = "default_configfs_root")]
    pub configfs_root: PathBuf,
    #[serde(default = "default_gadget_name")]
    pub name: String,
    #[serde(default = "default_udc_dir")]
    pub udc_dir: PathBuf,
    #[serde(default = "default_keyboard_device")]
    pub keyboard_device: PathBuf,
    #[serde(default = "default_mouse_device")]
    pub mouse_device: PathBuf,
    /// Pause after building the tree and after binding, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

/// Bluetooth disconnect monitoring.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BluetoothConfig {
    /// Watch udev for Bluetooth events and cancel handlers of devices that dropped.
    #[serde(default = "default_true")]
    pub monitor: bool,
    #[serde(default = "default_adapter")]
    pub adapter: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_log_level() -> LogLevel {
    LogLevel::Info
}
fn default_kbd_repeat() -> u64 {
    62
}
fn default_kbd_delay() -> u64 {
    300
}
fn default_keyboard_queue() -> usize {
    10
}
fn default_mouse_queue() -> usize {
    100
}
fn default_configfs_root() -> PathBuf {
    PathBuf::from("/sys/kernel/config/usb_gadget")
}
fn default_gadget_name() -> String {
    "piproxy".to_string()
}
fn default_udc_dir() -> PathBuf {
    PathBuf::from("/sys/class/udc")
}
fn default_keyboard_device() -> PathBuf {
    PathBuf::from("/dev/hidg0")
}
fn default_mouse_device() -> PathBuf {
    PathBuf::from("/dev/hidg1")
}
fn default_settle_ms() -> u64 {
    1000
}
fn default_adapter() -> String {
    "hci0".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            capture: CaptureConfig::default(),
            gadget: GadgetConfig::default(),
            bluetooth: BluetoothConfig::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            keyboard: default_true(),
            mouse: default_true(),
            kbd_repeat: default_kbd_repeat(),
            kbd_delay: default_kbd_delay(),
            keyboard_queue: default_keyboard_queue(),
            mouse_queue: default_mouse_queue(),
        }
    }
}

impl Default for GadgetConfig {
    fn default() -> Self {
        Self {
            setup: default_true(),
            configfs_root: default_configfs_root(),
            name: default_gadget_name(),
            udc_dir: default_udc_dir(),
            keyboard_device: default_keyboard_device(),
            mouse_device: default_mouse_device(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            monitor: default_true(),
            adapter: default_adapter(),
        }
    }
}

impl CaptureConfig {
    /// Hardware key-repeat as `(delay, period)`.
    pub fn key_repeat(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.kbd_delay),
            Duration::from_millis(self.kbd_repeat),
        )
    }
}

impl GadgetConfig {
    /// The gadget's own directory under the configfs root.
    pub fn gadget_dir(&self) -> PathBuf {
        self.configfs_root.join(&self.name)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads `ProxyConfig` from `path`, returning `ProxyConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProxyConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
