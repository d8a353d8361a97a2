#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Linux access to the Wii balance board: the evdev event node, discovery
//! through the input-device listing, the sysfs battery gauge, plus a
//! simulated board for running without hardware.

pub mod battery;
pub mod discovery;
pub mod error;
pub mod evdev;
pub mod sim;

pub use battery::BatteryGauge;
pub use discovery::{DiscoveredBoard, discover};
pub use error::HwError;
pub use evdev::{EvdevDevice, decode_events};
pub use sim::SimulatedBoard;
