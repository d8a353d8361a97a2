#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the balance-board reader.
//!
//! Every section is optional; an empty file yields the stock thresholds the
//! board has always been tuned for. `Config::validate` must be called after
//! parsing, since serde only checks shape, not ranges.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Nintendo vendor id.
pub const DEFAULT_VENDOR: u16 = 0x057E;
/// Balance board product id.
pub const DEFAULT_PRODUCT: u16 = 0x0306;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceCfg {
    pub vendor: u16,
    pub product: u16,
    /// Input-device listing used to locate the board and its sysfs node.
    pub devices_list: PathBuf,
    /// Directory holding the `eventN` character devices.
    pub input_dir: PathBuf,
    /// Prefix prepended to the listing's `Sysfs=` path.
    pub sys_root: PathBuf,
}

impl Default for DeviceCfg {
    fn default() -> Self {
        Self {
            vendor: DEFAULT_VENDOR,
            product: DEFAULT_PRODUCT,
            devices_list: PathBuf::from("/proc/bus/input/devices"),
            input_dir: PathBuf::from("/dev/input"),
            sys_root: PathBuf::from("/sys"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReaderCfg {
    /// Batches shorter than this are treated as incomplete and skipped.
    pub min_batch_len: usize,
    /// Relative drift from the last stable weight that requests a recalibration.
    pub deviation_ratio: f64,
    /// Totals below this mean nobody is standing on the board.
    pub min_total: f64,
}

impl Default for ReaderCfg {
    fn default() -> Self {
        Self {
            min_batch_len: 5,
            deviation_ratio: 0.05,
            min_total: 200.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Minimum stable time after the last reset before a cycle may converge.
    pub stable_window_ms: u64,
    /// Give up when no sample has been accepted for this long.
    pub abandon_after_ms: u64,
    /// Minimum accepted samples after the last reset before a cycle may converge.
    pub min_samples: u32,
    /// Sum of the four corners below which the stream counts as unstable.
    pub min_weight: i64,
    /// Largest relative step between consecutive samples still considered stable.
    pub max_step_ratio: f64,
    /// Zero the published weight as soon as a cycle starts (legacy behaviour).
    pub reset_weight_on_claim: bool,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            stable_window_ms: 3_000,
            abandon_after_ms: 5_000,
            min_samples: 100,
            min_weight: 100,
            max_step_ratio: 0.20,
            reset_weight_on_claim: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputCfg {
    /// Slots in the raw Sample tap handed to consumers.
    pub sample_buffer: usize,
    /// Slots in the calibrated weight channel.
    pub weight_buffer: usize,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            sample_buffer: 1,
            weight_buffer: 1,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub device: DeviceCfg,
    pub reader: ReaderCfg,
    pub calibration: CalibrationCfg,
    pub output: OutputCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn ratio_ok(r: f64) -> bool {
    r.is_finite() && r > 0.0 && r <= 1.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Reader
        if self.reader.min_batch_len == 0 {
            eyre::bail!("reader.min_batch_len must be >= 1");
        }
        if !ratio_ok(self.reader.deviation_ratio) {
            eyre::bail!("reader.deviation_ratio must be in (0.0, 1.0]");
        }
        if !self.reader.min_total.is_finite() || self.reader.min_total < 0.0 {
            eyre::bail!("reader.min_total must be a finite value >= 0");
        }

        // Calibration
        let c = &self.calibration;
        if c.stable_window_ms == 0 {
            eyre::bail!("calibration.stable_window_ms must be >= 1");
        }
        if c.abandon_after_ms == 0 {
            eyre::bail!("calibration.abandon_after_ms must be >= 1");
        }
        if c.stable_window_ms > 10 * 60 * 1000 || c.abandon_after_ms > 10 * 60 * 1000 {
            eyre::bail!("calibration windows are unreasonably large (>10min)");
        }
        if c.min_samples == 0 {
            eyre::bail!("calibration.min_samples must be >= 1");
        }
        if c.min_weight < 1 {
            eyre::bail!("calibration.min_weight must be >= 1");
        }
        if !ratio_ok(c.max_step_ratio) {
            eyre::bail!("calibration.max_step_ratio must be in (0.0, 1.0]");
        }

        // Output
        if self.output.sample_buffer == 0 {
            eyre::bail!("output.sample_buffer must be >= 1");
        }
        if self.output.weight_buffer == 0 {
            eyre::bail!("output.weight_buffer must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}
