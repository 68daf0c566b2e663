//! Input device detection for the scanner and exit keyboards
//!
//! Devices are exposed through the small [`InputDevice`] capability interface so the
//! scanner manager and the exit-key monitor only depend on names, paths and key support.

use anyhow::{Context, Result};
use evdev::{Device, EventType, KeyCode};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::constants::{paths, permissions};

/// Capability a device may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Emits EV_KEY events at all
    Keys,
    /// Can produce this particular key code
    Key(u16),
}

/// Capability query interface over an attached input device
pub trait InputDevice {
    fn name(&self) -> &str;
    fn path(&self) -> &Path;
    fn has_capability(&self, capability: Capability) -> bool;
}

/// An opened evdev device together with its node path
pub struct EvdevDevice {
    device: Device,
    path: PathBuf,
    name: String,
}

impl EvdevDevice {
    pub fn open(path: &Path) -> Result<Self> {
        let device = Device::open(path)
            .with_context(|| format!("Failed to open input device {}", path.display()))?;
        let name = device.name().unwrap_or_default().to_string();
        Ok(Self {
            device,
            path: path.to_path_buf(),
            name,
        })
    }

    pub fn into_device(self) -> Device {
        self.device
    }
}

impl InputDevice for EvdevDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Keys => self.device.supported_events().contains(EventType::KEY),
            Capability::Key(code) => self
                .device
                .supported_keys()
                .is_some_and(|keys| keys.contains(KeyCode(code))),
        }
    }
}

/// Opens every event node under /dev/input that the current user can read
pub fn enumerate_input_devices() -> Result<Vec<EvdevDevice>> {
    let mut devices = Vec::new();

    for entry in std::fs::read_dir(paths::DEV_INPUT).with_context(|| {
        format!(
            "Failed to read {} - are you in the '{}' group?",
            paths::DEV_INPUT,
            permissions::INPUT_GROUP
        )
    })? {
        let path = entry?.path();
        let is_event_node = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("event"));
        if !is_event_node {
            continue;
        }

        match EvdevDevice::open(&path) {
            Ok(device) => {
                debug!(device_path = %path.display(), name = %device.name(), "Found input device");
                devices.push(device);
            }
            Err(e) => debug!(device_path = %path.display(), error = %e, "Skipping unreadable input device"),
        }
    }

    Ok(devices)
}

/// Picks the first device whose name contains `name_fragment`
pub fn select_scanner<D: InputDevice>(devices: Vec<D>, name_fragment: &str) -> Option<D> {
    devices.into_iter().find(|d| d.name().contains(name_fragment))
}

/// Keeps the keyboards that can press `probe_key`, excluding the scanner itself
pub fn select_exit_keyboards<D: InputDevice>(devices: Vec<D>, scanner_fragment: &str, probe_key: u16) -> Vec<D> {
    devices
        .into_iter()
        .filter(|d| !d.name().contains(scanner_fragment))
        .filter(|d| d.has_capability(Capability::Keys) && d.has_capability(Capability::Key(probe_key)))
        .collect()
}

/// Check if the input directory is readable (user has input group permissions)
pub fn check_permissions() -> bool {
    std::fs::read_dir(paths::DEV_INPUT).is_ok()
}

/// Print helpful error message if permissions missing
pub fn print_permission_error() {
    error!(path = %paths::DEV_INPUT, "Cannot access input devices");
    error!(group = %permissions::INPUT_GROUP, "Scanner input requires group membership");
    error!(command = %permissions::ADD_TO_INPUT_GROUP, "Add user to input group");
    error!("  Then log out and back in");
    warn!(continuing = true, "Continuing; scanner discovery will keep retrying...");
}

/// Log every attached device once at startup, handy when configuring the scanner name
pub fn log_attached_devices(scanner_fragment: &str) {
    match enumerate_input_devices() {
        Ok(devices) => {
            for device in &devices {
                info!(
                    device_path = %device.path().display(),
                    name = %device.name(),
                    is_scanner = device.name().contains(scanner_fragment),
                    "Attached input device"
                );
            }
        }
        Err(e) => warn!(error = %e, "Could not list input devices"),
    }
}
