//! Runtime configuration used by the reader and the calibration engine.
//!
//! These are separate from the TOML-deserialized config in `board_config`;
//! see `conversions` for the mapping.
use std::time::Duration;

/// Reader loop thresholds.
#[derive(Debug, Clone)]
pub struct ReaderCfg {
    /// Batches with fewer events are skipped as incomplete. Default: 5.
    pub min_batch_len: usize,
    /// Relative drift from the last stable weight that requests a recalibration. Default: 0.05.
    pub deviation_ratio: f64,
    /// Totals below this are dropped while idle (empty board). Default: 200.
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

/// Stabilization parameters of one calibration cycle.
#[derive(Debug, Clone)]
pub struct CalibrationCfg {
    /// Time that must pass after the last instability reset before convergence.
    pub stable_window: Duration,
    /// Abandon the cycle if no sample is accepted for this long.
    pub abandon_after: Duration,
    /// Accepted samples required after the last reset before convergence.
    pub min_samples: u32,
    /// Corner sum below which the stream is treated as unstable.
    pub min_weight: i64,
    /// Relative step between consecutive samples that counts as instability.
    pub max_step_ratio: f64,
    /// Zero the shared weight on claim instead of keeping it until convergence.
    pub reset_weight_on_claim: bool,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            stable_window: Duration::from_secs(3),
            abandon_after: Duration::from_secs(5),
            min_samples: 100,
            min_weight: 100,
            max_step_ratio: 0.20,
            reset_weight_on_claim: false,
        }
    }
}

/// Capacity of the consumer-facing channels.
#[derive(Debug, Clone)]
pub struct OutputCfg {
    pub sample_buffer: usize,
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
