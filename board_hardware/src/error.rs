use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("no input device with vendor {vendor:04x} product {product:04x}")]
    NotFound { vendor: u16, product: u16 },
    #[error("board listed without a sysfs location")]
    MissingSysfs,
    #[error("board listed without an event handler")]
    MissingHandler,
    #[error("expected exactly one battery capacity file, found {}", found.len())]
    BatteryPath { found: Vec<PathBuf> },
    #[error("invalid battery search pattern: {0}")]
    BatteryPattern(#[from] glob::PatternError),
    #[error("battery capacity is not a percentage: {content:?}")]
    BatteryParse { content: String },
    #[error("device disconnected")]
    Disconnected,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
