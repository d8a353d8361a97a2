//! Locating the board from the kernel's input-device listing.
//!
//! The listing (normally `/proc/bus/input/devices`) is a series of stanzas
//! separated by blank lines:
//!
//! ```text
//! I: Bus=0005 Vendor=057e Product=0306 Version=8001
//! N: Name="Nintendo Wii Remote Balance Board"
//! S: Sysfs=/devices/virtual/misc/uhid/0005:057E:0306.0004/input/input23
//! H: Handlers=event19
//! ```
//!
//! The `I:` line identifies the board, `H:` names its event node and `S:` its
//! sysfs directory, under which the battery capacity file lives.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use board_config::DeviceCfg;
use glob::{GlobError, Pattern};
use regex::Regex;

use crate::error::{HwError, Result};

/// Everything needed to open and monitor a detected board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBoard {
    /// Event character device, e.g. `/dev/input/event19`.
    pub event_path: PathBuf,
    /// Sysfs path as listed, without the sysfs root.
    pub sysfs: String,
    pub battery_path: PathBuf,
}

#[allow(clippy::expect_used)]
fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^I:.*\bVendor=([0-9A-Fa-f]{4})\s+Product=([0-9A-Fa-f]{4})")
            .expect("static regex")
    })
}

#[allow(clippy::expect_used)]
fn sysfs_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^S: Sysfs=(.*)$").expect("static regex"))
}

#[allow(clippy::expect_used)]
fn handler_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^H: Handlers=.*?\b(event\d+)\b").expect("static regex"))
}

/// The parts of the board's stanza we care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedBoard {
    pub handler: String,
    pub sysfs: String,
}

fn is_board(line: &str, vendor: u16, product: u16) -> bool {
    id_pattern().captures(line).is_some_and(|c| {
        u16::from_str_radix(&c[1], 16).ok() == Some(vendor)
            && u16::from_str_radix(&c[2], 16).ok() == Some(product)
    })
}

/// Find the first stanza of `listing` whose identity matches.
pub fn find_in_listing(listing: &str, vendor: u16, product: u16) -> Result<ListedBoard> {
    let mut stanza: Vec<&str> = Vec::new();
    // a trailing empty line flushes the last stanza
    for line in listing.lines().chain(std::iter::once("")) {
        let line = line.trim_end();
        if !line.is_empty() {
            stanza.push(line);
            continue;
        }
        if stanza.iter().any(|l| is_board(l, vendor, product)) {
            let sysfs = stanza
                .iter()
                .find_map(|l| sysfs_pattern().captures(l).map(|c| c[1].trim().to_string()))
                .ok_or(HwError::MissingSysfs)?;
            let handler = stanza
                .iter()
                .find_map(|l| handler_pattern().captures(l).map(|c| c[1].to_string()))
                .ok_or(HwError::MissingHandler)?;
            return Ok(ListedBoard { handler, sysfs });
        }
        stanza.clear();
    }
    Err(HwError::NotFound { vendor, product })
}

/// The single `power_supply/*/capacity` match under the board's sysfs node.
pub fn battery_path(sys_root: &Path, sysfs: &str) -> Result<PathBuf> {
    let supplies = sys_root
        .join(sysfs.trim_start_matches('/'))
        .join("device")
        .join("power_supply");
    let pattern = format!("{}/*/capacity", Pattern::escape(&supplies.to_string_lossy()));
    let mut found = Vec::new();
    for entry in glob::glob(&pattern)? {
        found.push(entry.map_err(GlobError::into_error)?);
    }
    found.sort();
    if found.len() == 1 {
        Ok(found.remove(0))
    } else {
        Err(HwError::BatteryPath { found })
    }
}

/// Locate the first connected board described by `cfg`.
pub fn discover(cfg: &DeviceCfg) -> Result<DiscoveredBoard> {
    let listing = fs::read_to_string(&cfg.devices_list)?;
    let listed = find_in_listing(&listing, cfg.vendor, cfg.product)?;
    let event_path = cfg.input_dir.join(&listed.handler);
    let battery_path = battery_path(&cfg.sys_root, &listed.sysfs)?;
    tracing::debug!(
        event = %event_path.display(),
        battery = %battery_path.display(),
        "balance board found"
    );
    Ok(DiscoveredBoard {
        event_path,
        sysfs: listed.sysfs,
        battery_path,
    })
}
