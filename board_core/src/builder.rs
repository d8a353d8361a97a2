//! Builder for `Board`, the assembled reader + calibration pipeline.

use crate::config::{CalibrationCfg, OutputCfg, ReaderCfg};
use crate::error::BuildError;
use board_traits::EventSource;
use board_traits::clock::{Clock, MonotonicClock};

/// A configured but not yet running pipeline. See `Board::start`.
pub struct Board<S, C = MonotonicClock> {
    pub(crate) source: S,
    pub(crate) clock: C,
    pub(crate) reader: ReaderCfg,
    pub(crate) calibration: CalibrationCfg,
    pub(crate) output: OutputCfg,
    pub(crate) initial_weight: f64,
}

impl<S, C> core::fmt::Debug for Board<S, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Board")
            .field("reader", &self.reader)
            .field("calibration", &self.calibration)
            .field("output", &self.output)
            .field("initial_weight", &self.initial_weight)
            .finish()
    }
}

impl<S: EventSource> Board<S> {
    /// Start building a Board.
    pub fn builder() -> BoardBuilder<S> {
        BoardBuilder::default()
    }
}

/// Builder for `Board`. Everything but the source has a default.
pub struct BoardBuilder<S, C = MonotonicClock> {
    source: Option<S>,
    clock: C,
    reader: ReaderCfg,
    calibration: CalibrationCfg,
    output: OutputCfg,
    initial_weight: f64,
}

impl<S> Default for BoardBuilder<S> {
    fn default() -> Self {
        Self {
            source: None,
            clock: MonotonicClock::new(),
            reader: ReaderCfg::default(),
            calibration: CalibrationCfg::default(),
            output: OutputCfg::default(),
            initial_weight: 0.0,
        }
    }
}

impl<S: EventSource, C: Clock> BoardBuilder<S, C> {
    pub fn with_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// Swap the time source used by the calibration engine.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> BoardBuilder<S, C2> {
        BoardBuilder {
            source: self.source,
            clock,
            reader: self.reader,
            calibration: self.calibration,
            output: self.output,
            initial_weight: self.initial_weight,
        }
    }

    pub fn with_reader_cfg(mut self, cfg: ReaderCfg) -> Self {
        self.reader = cfg;
        self
    }

    pub fn with_calibration_cfg(mut self, cfg: CalibrationCfg) -> Self {
        self.calibration = cfg;
        self
    }

    pub fn with_output_cfg(mut self, cfg: OutputCfg) -> Self {
        self.output = cfg;
        self
    }

    /// Seed the last stable weight, e.g. from a previous run.
    pub fn with_initial_weight(mut self, weight: f64) -> Self {
        self.initial_weight = weight;
        self
    }

    /// Apply the reader, calibration and output sections of a parsed config.
    pub fn with_config(self, cfg: &board_config::Config) -> Self {
        self.with_reader_cfg((&cfg.reader).into())
            .with_calibration_cfg((&cfg.calibration).into())
            .with_output_cfg((&cfg.output).into())
    }

    pub fn build(self) -> Result<Board<S, C>, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSource)?;
        if self.reader.min_batch_len == 0 {
            return Err(BuildError::InvalidConfig("min_batch_len must be >= 1"));
        }
        if !(self.reader.deviation_ratio > 0.0) {
            return Err(BuildError::InvalidConfig("deviation_ratio must be > 0"));
        }
        if self.calibration.min_samples == 0 {
            return Err(BuildError::InvalidConfig("min_samples must be >= 1"));
        }
        if self.calibration.min_weight < 1 {
            return Err(BuildError::InvalidConfig("min_weight must be >= 1"));
        }
        if self.calibration.stable_window.is_zero() || self.calibration.abandon_after.is_zero() {
            return Err(BuildError::InvalidConfig("calibration windows must be non-zero"));
        }
        if !(self.calibration.max_step_ratio > 0.0) {
            return Err(BuildError::InvalidConfig("max_step_ratio must be > 0"));
        }
        if self.output.sample_buffer == 0 || self.output.weight_buffer == 0 {
            return Err(BuildError::InvalidConfig("output buffers must be >= 1"));
        }
        if !self.initial_weight.is_finite() {
            return Err(BuildError::InvalidConfig("initial weight must be finite"));
        }
        Ok(Board {
            source,
            clock: self.clock,
            reader: self.reader,
            calibration: self.calibration,
            output: self.output,
            initial_weight: self.initial_weight,
        })
    }
}
