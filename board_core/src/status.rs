//! Outcomes reported by the reader and the calibration engine.

/// What the calibration cycle did with one offered sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A corner read exactly 0; skipped without touching the accumulators.
    Rejected,
    /// Too light or moved too much; accumulators and stable window restarted.
    Reset,
    /// Added to the running sums.
    Accepted,
}

/// State of a calibration cycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleStatus {
    /// Still waiting for a long enough stable run.
    Accumulating,
    /// Stable window and sample count reached; carries the filtered weight.
    Converged(f64),
    /// Nothing acceptable arrived in time.
    Abandoned,
}

/// Result of one call to `Calibrator::run_cycle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Another cycle already owned the state; nothing was done.
    NotClaimed,
    Converged { weight: f64, samples: u32 },
    Abandoned,
}

/// What the reader did at a cycle-boundary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not all four corners were reported; discarded.
    Incomplete,
    /// Total drifted from the last stable weight; recalibration requested.
    Recalibrate,
    /// Nobody on the board; discarded.
    BelowFloor,
    /// Handed to the calibration engine.
    Forwarded,
    /// Engine not ready to take it; dropped.
    Dropped,
}
