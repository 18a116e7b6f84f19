//! Port snapshot producers.
//!
//! A [`PortSource`] returns every currently present port in one call, in no
//! particular order. The monitor treats a failed call as an empty snapshot.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PortError, Result};
use crate::types::PortSnapshotEntry;

pub trait PortSource {
    fn enumerate(&mut self) -> Result<Vec<PortSnapshotEntry>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Static
// ─────────────────────────────────────────────────────────────────────────────

/// Returns a caller-provided snapshot, optionally failing instead.
#[derive(Debug, Default, Clone)]
pub struct StaticPortSource {
    ports: Vec<PortSnapshotEntry>,
    failing: bool,
}

impl StaticPortSource {
    pub fn new(ports: Vec<PortSnapshotEntry>) -> Self {
        Self {
            ports,
            failing: false,
        }
    }

    pub fn set_ports(&mut self, ports: Vec<PortSnapshotEntry>) {
        self.ports = ports;
        self.failing = false;
    }

    /// Makes every following call fail until `set_ports` is called again.
    pub fn set_failing(&mut self) {
        self.failing = true;
    }
}

impl PortSource for StaticPortSource {
    fn enumerate(&mut self) -> Result<Vec<PortSnapshotEntry>> {
        if self.failing {
            return Err(PortError::EnumerationFailed(
                "static source set to fail".to_string(),
            ));
        }
        Ok(self.ports.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sysfs (Linux)
// ─────────────────────────────────────────────────────────────────────────────

const SYSFS_TTY_CLASS: &str = "/sys/class/tty";
const DEV_DIR: &str = "/dev";

/// How far up from a tty's `device` link to look for USB descriptors.
const USB_ANCESTOR_DEPTH: usize = 4;

/// Enumerates serial ports from `/sys/class/tty`.
///
/// Only ttys backed by a device are considered. Legacy 8250 ports whose UART
/// type is unknown (`type == 0`) are placeholders and are skipped.
#[derive(Debug, Clone)]
pub struct SysfsPortSource {
    class_dir: PathBuf,
    dev_dir: PathBuf,
}

impl Default for SysfsPortSource {
    fn default() -> Self {
        Self::with_dirs(PathBuf::from(SYSFS_TTY_CLASS), PathBuf::from(DEV_DIR))
    }
}

impl SysfsPortSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points enumeration at alternate sysfs and dev roots.
    pub fn with_dirs(class_dir: PathBuf, dev_dir: PathBuf) -> Self {
        Self { class_dir, dev_dir }
    }

    fn port_entry(&self, tty_dir: &Path, name: &str) -> Option<PortSnapshotEntry> {
        let device_link = tty_dir.join("device");
        let device_dir = fs_err::canonicalize(&device_link).ok()?;

        if read_attr(tty_dir, "type").as_deref() == Some("0") {
            debug!(tty = %name, "Skipping placeholder UART");
            return None;
        }

        let driver = fs_err::canonicalize(device_dir.join("driver"))
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()));

        let usb_dir = device_dir
            .ancestors()
            .take(USB_ANCESTOR_DEPTH)
            .find(|dir| dir.join("idVendor").is_file());

        let product = usb_dir.and_then(|dir| read_attr(dir, "product"));
        let hardware_id = usb_dir.and_then(|dir| {
            let vid = read_attr(dir, "idVendor")?;
            let pid = read_attr(dir, "idProduct")?;
            Some(format!(
                "USB\\VID_{}&PID_{}",
                vid.to_ascii_uppercase(),
                pid.to_ascii_uppercase()
            ))
        });

        let display_name = product.or(driver).unwrap_or_else(|| name.to_string());

        Some(PortSnapshotEntry {
            device_id: self.dev_dir.join(name).to_string_lossy().to_string(),
            display_name,
            hardware_id,
        })
    }
}

impl PortSource for SysfsPortSource {
    fn enumerate(&mut self) -> Result<Vec<PortSnapshotEntry>> {
        let entries = fs_err::read_dir(&self.class_dir)
            .map_err(|e| PortError::EnumerationFailed(e.to_string()))?;

        let mut ports: Vec<PortSnapshotEntry> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                self.port_entry(&entry.path(), &name)
            })
            .collect();

        ports.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        Ok(ports)
    }
}

fn read_attr(dir: &Path, attr: &str) -> Option<String> {
    let value = fs_err::read_to_string(dir.join(attr)).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
