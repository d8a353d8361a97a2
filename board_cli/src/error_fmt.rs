//! Human-readable error descriptions, exit codes and structured JSON errors.

use board_core::{BoardError, BuildError};
use board_hardware::HwError;

/// Exit code for anything without a more specific one.
pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_DISCONNECTED: i32 = 3;
pub const EXIT_NOT_FOUND: i32 = 4;
pub const EXIT_BATTERY: i32 = 5;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BoardError>() {
        return match be {
            BoardError::Disconnected(detail) => format!(
                "What happened: The balance board disconnected ({detail}).\nLikely causes: Batteries ran out, the board went to sleep, or Bluetooth dropped.\nHow to fix: Press the sync button to reconnect, then rerun."
            ),
            BoardError::DeviceRead(detail) => format!(
                "What happened: Reading the board failed ({detail}).\nLikely causes: Insufficient permissions on the event node or a flaky Bluetooth link.\nHow to fix: Check access to /dev/input/event*, then reconnect the board."
            ),
            BoardError::State(detail) => format!(
                "What happened: Internal state error ({detail}).\nHow to fix: Re-run with --log-level=debug and report the log."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::NotFound { vendor, product } => format!(
                "What happened: No balance board found (vendor {vendor:04x}, product {product:04x}).\nLikely causes: The board is not paired or not connected.\nHow to fix: Press the red sync button under the battery cover and pair it over Bluetooth."
            ),
            HwError::MissingSysfs | HwError::MissingHandler => format!(
                "What happened: The board is listed but incomplete ({hw}).\nLikely causes: The kernel driver is still setting the device up.\nHow to fix: Wait a moment and rerun."
            ),
            HwError::BatteryPath { found } => format!(
                "What happened: Could not locate a single battery capacity file ({} candidates).\nLikely causes: The kernel driver does not expose a power supply for this board.\nHow to fix: Check /sys/class/power_supply for the board's entry.",
                found.len()
            ),
            HwError::BatteryPattern(e) => format!(
                "What happened: The battery search pattern was rejected ({e}).\nHow to fix: Check the board's sysfs location and rerun."
            ),
            HwError::BatteryParse { content } => format!(
                "What happened: The battery level could not be read (got {content:?}).\nHow to fix: Reconnect the board and rerun."
            ),
            HwError::Disconnected => "What happened: The balance board disconnected.\nHow to fix: Press the sync button to reconnect, then rerun.".to_string(),
            HwError::Io(e) => format!(
                "What happened: I/O error talking to the board ({e}).\nLikely causes: Missing permissions on /dev/input or /proc.\nHow to fix: Run with access to the input devices (e.g. the 'input' group)."
            ),
        };
    }

    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
        );
    }

    let msg = err.to_string();
    if msg.to_ascii_lowercase().contains("config") {
        let cause = err
            .chain()
            .skip(1)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ");
        return format!(
            "What happened: {msg}.\nDetails: {cause}\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per failure class.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(be) = err.downcast_ref::<BoardError>() {
        return if be.is_fatal() {
            EXIT_DISCONNECTED
        } else {
            EXIT_GENERIC
        };
    }
    match err.downcast_ref::<HwError>() {
        Some(HwError::Disconnected) => EXIT_DISCONNECTED,
        Some(HwError::NotFound { .. } | HwError::MissingSysfs | HwError::MissingHandler) => {
            EXIT_NOT_FOUND
        }
        Some(
            HwError::BatteryPath { .. }
            | HwError::BatteryPattern(_)
            | HwError::BatteryParse { .. },
        ) => EXIT_BATTERY,
        _ => EXIT_GENERIC,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BoardError>() {
        return match be {
            BoardError::Disconnected(_) => "Disconnected",
            BoardError::DeviceRead(_) => "DeviceRead",
            BoardError::State(_) => "State",
        };
    }
    match err.downcast_ref::<HwError>() {
        Some(HwError::NotFound { .. }) => "NotFound",
        Some(HwError::MissingSysfs) => "MissingSysfs",
        Some(HwError::MissingHandler) => "MissingHandler",
        Some(HwError::BatteryPath { .. }) => "BatteryPath",
        Some(HwError::BatteryPattern(_)) => "BatteryPattern",
        Some(HwError::BatteryParse { .. }) => "BatteryParse",
        Some(HwError::Disconnected) => "Disconnected",
        Some(HwError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
