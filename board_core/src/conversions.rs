//! Mapping from the TOML schema in `board_config` to runtime config.

use crate::config::{CalibrationCfg, OutputCfg, ReaderCfg};
use std::time::Duration;

impl From<&board_config::ReaderCfg> for ReaderCfg {
    fn from(r: &board_config::ReaderCfg) -> Self {
        Self {
            min_batch_len: r.min_batch_len,
            deviation_ratio: r.deviation_ratio,
            min_total: r.min_total,
        }
    }
}

impl From<&board_config::CalibrationCfg> for CalibrationCfg {
    fn from(c: &board_config::CalibrationCfg) -> Self {
        Self {
            stable_window: Duration::from_millis(c.stable_window_ms),
            abandon_after: Duration::from_millis(c.abandon_after_ms),
            min_samples: c.min_samples,
            min_weight: c.min_weight,
            max_step_ratio: c.max_step_ratio,
            reset_weight_on_claim: c.reset_weight_on_claim,
        }
    }
}

impl From<&board_config::OutputCfg> for OutputCfg {
    fn from(o: &board_config::OutputCfg) -> Self {
        Self {
            // zero-capacity would turn the tap into a rendezvous
            sample_buffer: o.sample_buffer.max(1),
            weight_buffer: o.weight_buffer.max(1),
        }
    }
}
