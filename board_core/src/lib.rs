#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Balance-board signal stabilization (hardware-agnostic).
//!
//! All device interaction goes through `board_traits::EventSource`.
//!
//! ## Architecture
//!
//! - **Reader** (`reader`): assembles one `Sample` per reporting cycle and
//!   decides whether it triggers a recalibration, is discarded, or is handed
//!   to the engine.
//! - **Calibration** (`calibration`): the stabilization state machine and the
//!   engine that drives it against live samples.
//! - **State** (`state`): last stable weight plus the "calibrating" claim,
//!   shared by the two loops.
//! - **Runner** (`builder`, `runner`): wires both loops onto threads and
//!   exposes the weight and sample channels.
//!
//! Hand-offs out of the reader are non-blocking: a busy engine or a slow
//! consumer loses samples, it never stalls the device read.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod reader;
pub mod runner;
pub mod sample;
pub mod state;
pub mod status;
pub mod trigger;

pub use builder::{Board, BoardBuilder};
pub use calibration::{CalibrationCycle, Calibrator};
pub use config::{CalibrationCfg, OutputCfg, ReaderCfg};
pub use error::{BoardError, BuildError};
pub use reader::{Reader, ReaderCounts, deviates};
pub use runner::BoardHandle;
pub use sample::{Sample, SampleBuilder};
pub use state::{CalibrationState, Snapshot};
pub use status::{CycleOutcome, CycleStatus, Dispatch, Verdict};
pub use trigger::{CalibrationRequests, CalibrationTrigger};
