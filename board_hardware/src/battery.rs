use std::fs;
use std::path::{Path, PathBuf};

use board_traits::Battery;

use crate::error::{HwError, Result};

/// Reads the board's sysfs `capacity` file on demand.
#[derive(Debug, Clone)]
pub struct BatteryGauge {
    path: PathBuf,
}

impl BatteryGauge {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Integer percentage in `0..=100`; anything else is a parse error.
    pub fn read_percent(&self) -> Result<u8> {
        let content = fs::read_to_string(&self.path)?;
        match content.trim().parse::<u8>() {
            Ok(level) if level <= 100 => Ok(level),
            _ => Err(HwError::BatteryParse { content }),
        }
    }
}

impl Battery for BatteryGauge {
    fn percent(&self) -> std::result::Result<u8, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read_percent()?)
    }
}
