#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod logging;
mod watch;

use std::path::Path;

use board_hardware::{BatteryGauge, discover};
use clap::Parser;
use eyre::{Result, WrapErr};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    if let Err(e) = real_main() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

/// An explicit path must exist; the default one may be missing.
fn load_config(explicit: Option<&Path>) -> Result<board_config::Config> {
    match explicit {
        Some(path) => board_config::load_file(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG);
            if path.exists() {
                board_config::load_file(path)
            } else {
                Ok(board_config::Config::default())
            }
        }
    }
}

fn real_main() -> Result<()> {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = load_config(cli.config.as_deref()).wrap_err("invalid config")?;
    logging::init(&cfg.logging, &cli.log_level, cli.json).wrap_err("initialize logging")?;
    tracing::debug!(?cfg, "configuration loaded");

    match cli.cmd {
        Commands::Detect => {
            let found = discover(&cfg.device)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "device": found.event_path.display().to_string(),
                        "sysfs": found.sysfs,
                        "battery": found.battery_path.display().to_string(),
                    })
                );
            } else {
                println!("device: {}", found.event_path.display());
                println!("battery: {}", found.battery_path.display());
            }
        }
        Commands::Battery => {
            let found = discover(&cfg.device)?;
            let percent = BatteryGauge::new(found.battery_path).read_percent()?;
            if cli.json {
                println!("{}", serde_json::json!({ "battery_percent": percent }));
            } else {
                println!("battery: {percent}%");
            }
        }
        Commands::Watch {
            simulate,
            samples,
            count,
        } => {
            let opts = watch::WatchOpts {
                simulate,
                samples,
                count,
                json: cli.json,
            };
            watch::run(&cfg, &opts)?;
        }
    }
    Ok(())
}
