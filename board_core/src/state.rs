//! Calibration state shared between the reader loop and the calibration engine.
//!
//! The reader only ever takes the read lock, through [`CalibrationState::snapshot`].
//! The engine takes the write lock exactly twice per cycle: once in
//! [`CalibrationState::try_claim`] and once in `converge`/`abandon`.
//! No lock is held while waiting for samples.

use std::sync::{PoisonError, RwLock};

/// Copy of the shared state taken under the read lock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Snapshot {
    /// Most recently accepted calibrated weight; 0 before the first calibration.
    pub last_stable_weight: f64,
    pub is_calibrating: bool,
}

#[derive(Debug, Default)]
pub struct CalibrationState {
    inner: RwLock<Snapshot>,
    reset_weight_on_claim: bool,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known weight, e.g. one restored by the caller.
    pub fn with_weight(last_stable_weight: f64) -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                last_stable_weight,
                is_calibrating: false,
            }),
            reset_weight_on_claim: false,
        }
    }

    /// Zero the published weight when a cycle is claimed rather than at convergence.
    pub fn reset_weight_on_claim(mut self, on: bool) -> Self {
        self.reset_weight_on_claim = on;
        self
    }

    pub fn snapshot(&self) -> Snapshot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_stable_weight(&self) -> f64 {
        self.snapshot().last_stable_weight
    }

    pub fn is_calibrating(&self) -> bool {
        self.snapshot().is_calibrating
    }

    /// Claim exclusive ownership of a calibration cycle.
    ///
    /// Returns `false` when a cycle is already active. The cheap read-locked
    /// check is repeated under the write lock before anything changes.
    pub fn try_claim(&self) -> bool {
        if self.is_calibrating() {
            return false;
        }
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.is_calibrating {
            return false;
        }
        guard.is_calibrating = true;
        if self.reset_weight_on_claim {
            guard.last_stable_weight = 0.0;
        }
        true
    }

    /// Publish a converged weight and release ownership.
    pub fn converge(&self, weight: f64) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.last_stable_weight = weight;
        guard.is_calibrating = false;
    }

    /// Release ownership without touching the published weight.
    pub fn abandon(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.is_calibrating = false;
    }
}
