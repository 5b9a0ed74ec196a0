//! USB gadget provisioning through configfs, plus the report sinks.
//!
//! # What is configfs? (for beginners)
//!
//! On boards with a USB device controller (UDC), the Linux "gadget" framework
//! lets userspace describe a USB device by creating directories and writing
//! small attribute files under `/sys/kernel/config/usb_gadget/<name>/`:
//!
//! ```text
//! piproxy/
//! ├── idVendor, idProduct, bcdDevice, bcdUSB
//! ├── strings/0x409/{serialnumber,manufacturer,product}
//! ├── functions/hid.usb0/{protocol,subclass,report_length,report_desc}
//! ├── functions/hid.usb1/...
//! ├── configs/c.1/{MaxPower, strings/0x409/configuration}
//! ├── configs/c.1/hid.usb0 -> ../../functions/hid.usb0
//! └── UDC        ← writing a controller name here "plugs in" the device
//! ```
//!
//! Once bound, each HID function appears as a character device
//! (`/dev/hidg0`, `/dev/hidg1`) that accepts report bytes.
//!
//! # Idempotence
//!
//! Provisioning runs on every start.  Existing attributes are read back and
//! only rewritten if they differ, so a second run against an unchanged tree
//! performs no writes at all.  configfs appends a newline when text attributes
//! are read, which the comparison ignores.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hidproxy_core::report::descriptor;
use hidproxy_core::ReportClass;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod mock;
pub mod writer;

/// USB language ID for English (United States).
const LANG_EN_US: &str = "0x409";
const CONFIG_DIR: &str = "configs/c.1";
const KEYBOARD_FUNCTION: &str = "functions/hid.usb0";
const MOUSE_FUNCTION: &str = "functions/hid.usb1";

/// Error type for gadget provisioning.  Only structural failures are fatal;
/// attribute write failures are logged and skipped.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to link {link} -> {target}: {source}")]
    Symlink {
        target: PathBuf,
        link: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to list USB device controllers in {path}: {source}")]
    ListControllers {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the gadget tree lives and how long to let the kernel settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GadgetLayout {
    /// The gadget directory, e.g. `/sys/kernel/config/usb_gadget/piproxy`.
    pub root: PathBuf,
    /// Directory listing available controllers, normally `/sys/class/udc`.
    pub udc_dir: PathBuf,
    /// Pause after creating the tree and after binding the controller.
    pub settle: Duration,
}

/// What a provisioning run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub dirs_created: usize,
    pub attributes_written: usize,
    pub symlinks_created: usize,
    pub controller_bound: bool,
}

impl ProvisionSummary {
    /// Total number of filesystem modifications.
    pub fn writes(&self) -> usize {
        self.dirs_created
            + self.attributes_written
            + self.symlinks_created
            + usize::from(self.controller_bound)
    }
}

/// Creates or repairs the gadget tree and binds it to the first controller.
///
/// # Errors
///
/// Returns a [`ProvisionError`] if a directory or function link cannot be
/// created, or the controller directory cannot be listed.
pub fn provision(layout: &GadgetLayout) -> Result<ProvisionSummary, ProvisionError> {
    let root = &layout.root;
    let mut summary = ProvisionSummary::default();

    let dirs = [
        root.join("strings").join(LANG_EN_US),
        root.join(CONFIG_DIR).join("strings").join(LANG_EN_US),
        root.join(KEYBOARD_FUNCTION),
        root.join(MOUSE_FUNCTION),
    ];
    for dir in &dirs {
        if !dir.exists() {
            debug!("creating directory {}", dir.display());
            fs::create_dir_all(dir).map_err(|source| ProvisionError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            summary.dirs_created += 1;
        }
    }

    for (rel, value) in text_attributes() {
        if ensure_attribute(&root.join(rel), value.as_bytes(), Compare::Text) {
            summary.attributes_written += 1;
        }
    }
    for (function, class) in [
        (KEYBOARD_FUNCTION, ReportClass::Keyboard),
        (MOUSE_FUNCTION, ReportClass::Mouse),
    ] {
        let path = root.join(function).join("report_desc");
        if ensure_attribute(&path, descriptor::for_class(class), Compare::Exact) {
            summary.attributes_written += 1;
        }
    }

    for function in [KEYBOARD_FUNCTION, MOUSE_FUNCTION] {
        let target = root.join(function);
        let link = root.join(CONFIG_DIR).join(function_name(function));
        // symlink_metadata so a dangling link still counts as present.
        if fs::symlink_metadata(&link).is_err() {
            debug!("linking {} -> {}", link.display(), target.display());
            std::os::unix::fs::symlink(&target, &link).map_err(|source| {
                ProvisionError::Symlink {
                    target: target.clone(),
                    link: link.clone(),
                    source,
                }
            })?;
            summary.symlinks_created += 1;
        }
    }

    settle(layout.settle);

    match first_controller(&layout.udc_dir)? {
        Some(udc) => {
            summary.controller_bound =
                ensure_attribute(&root.join("UDC"), udc.as_bytes(), Compare::Text);
            if summary.controller_bound {
                info!("bound gadget to USB device controller {udc}");
            }
        }
        None => warn!(
            "no USB device controller found in {}; gadget left unbound",
            layout.udc_dir.display()
        ),
    }

    settle(layout.settle);
    Ok(summary)
}

/// Attribute files and their desired text content, in write order.
///
/// Identity attributes must be written before the functions are linked, and
/// the function attributes before `report_desc`.
fn text_attributes() -> Vec<(PathBuf, String)> {
    let strings = PathBuf::from("strings").join(LANG_EN_US);
    let config = PathBuf::from(CONFIG_DIR);
    let keyboard = PathBuf::from(KEYBOARD_FUNCTION);
    let mouse = PathBuf::from(MOUSE_FUNCTION);
    let keyboard_len = ReportClass::Keyboard.report_len().to_string();
    let mouse_len = ReportClass::Mouse.report_len().to_string();

    vec![
        (PathBuf::from("idVendor"), "0x1d6b".into()), // Linux Foundation
        (PathBuf::from("idProduct"), "0x0104".into()), // Multifunction Composite Gadget
        (PathBuf::from("bcdDevice"), "0x0100".into()),
        (PathBuf::from("bcdUSB"), "0x0200".into()),
        (strings.join("serialnumber"), "fedcba9876543210".into()),
        (strings.join("manufacturer"), "hidproxy".into()),
        (strings.join("product"), "hidproxy keyboard and mouse".into()),
        (config.join("strings").join(LANG_EN_US).join("configuration"), "Config 1: HID".into()),
        (config.join("MaxPower"), "250".into()),
        (keyboard.join("protocol"), "1".into()),
        (keyboard.join("subclass"), "1".into()),
        (keyboard.join("report_length"), keyboard_len),
        (mouse.join("protocol"), "2".into()),
        (mouse.join("subclass"), "1".into()),
        (mouse.join("report_length"), mouse_len),
    ]
}

#[derive(Debug, Clone, Copy)]
enum Compare {
    /// Ignore a single trailing newline on the current content.
    Text,
    /// Byte-for-byte.
    Exact,
}

/// Writes `desired` to `path` unless it already holds it.  Returns `true` if
/// a write succeeded.
fn ensure_attribute(path: &Path, desired: &[u8], compare: Compare) -> bool {
    if let Ok(current) = fs::read(path) {
        let current = match compare {
            Compare::Text => current.strip_suffix(b"\n").unwrap_or(&current),
            Compare::Exact => &current[..],
        };
        if current == desired {
            return false;
        }
    }
    debug!("writing {}", path.display());
    match fs::write(path, desired) {
        Ok(()) => true,
        Err(e) => {
            // A bound gadget rejects most attribute writes; assume it was set
            // up by hand and keep going.
            warn!("failed to write {} (maybe already set up): {e}", path.display());
            false
        }
    }
}

/// Returns the alphabetically first controller name in `udc_dir`.
fn first_controller(udc_dir: &Path) -> Result<Option<String>, ProvisionError> {
    let entries = fs::read_dir(udc_dir).map_err(|source| ProvisionError::ListControllers {
        path: udc_dir.to_path_buf(),
        source,
    })?;
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names.into_iter().next())
}

fn function_name(function: &str) -> &str {
    function.rsplit('/').next().unwrap_or(function)
}

fn settle(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
