//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Used when `--config` is not given; silently skipped if absent.
pub const DEFAULT_CONFIG: &str = "etc/board_config.toml";

#[derive(Parser, Debug)]
#[command(name = "board", version, about = "Wii balance board reader")]
pub struct Cli {
    /// Path to config TOML (defaults to etc/board_config.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate the board and print its event node and battery file
    Detect,
    /// Print the board's battery level
    Battery,
    /// Stream calibrated weights until interrupted
    Watch {
        /// Use a simulated board carrying this raw total instead of hardware
        #[arg(long, value_name = "TOTAL")]
        simulate: Option<i32>,
        /// Also print every raw sample
        #[arg(long, action = ArgAction::SetTrue)]
        samples: bool,
        /// Exit after this many weights
        #[arg(long, value_name = "N")]
        count: Option<u64>,
    },
}
