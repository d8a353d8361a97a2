//! Two-phase stabilization of the sample stream into one filtered weight.
//!
//! [`CalibrationCycle`] is the pure state machine: it is fed samples and
//! instants and never touches a clock or channel, so the timing rules can be
//! exercised with synthetic time. [`Calibrator`] drives one cycle at a time
//! against the live sample channel and publishes the result.
//!
//! A cycle restarts its accumulators whenever the stream looks unstable
//! (too light, or a step of more than `max_step_ratio` between consecutive
//! samples). It converges only once both `stable_window` has elapsed and
//! `min_samples` samples have been accepted since the last restart, and it is
//! abandoned when nothing has been accepted for `abandon_after`.

use crate::config::CalibrationCfg;
use crate::sample::Sample;
use crate::state::CalibrationState;
use crate::status::{CycleOutcome, CycleStatus, Verdict};
use crate::trigger::CalibrationRequests;
use board_traits::Clock;
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How often an idle engine re-checks the shutdown flag.
const IDLE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct CalibrationCycle {
    cfg: CalibrationCfg,
    sums: [i64; 4],
    n: u32,
    last_weight: i64,
    stable_at: Instant,
    abandon_at: Instant,
}

/// Relative step from `last` to `new`, measured against `new`.
#[inline]
fn step_ratio(last: i64, new: i64) -> f64 {
    (last - new).abs() as f64 / new as f64
}

impl CalibrationCycle {
    pub fn start(cfg: &CalibrationCfg, now: Instant) -> Self {
        Self {
            cfg: cfg.clone(),
            sums: [0; 4],
            n: 0,
            last_weight: 0,
            stable_at: now + cfg.stable_window,
            abandon_at: now + cfg.abandon_after,
        }
    }

    /// Feed one sample observed at `now`.
    pub fn offer(&mut self, sample: &Sample, now: Instant) -> Verdict {
        // A zero corner means one-sided contact, never equilibrium.
        if sample.has_zero_corner() {
            tracing::trace!(?sample, "calibration: zero corner, skipped");
            return Verdict::Rejected;
        }

        let new_weight = sample.corner_sum();
        if new_weight < self.cfg.min_weight
            || step_ratio(self.last_weight, new_weight) > self.cfg.max_step_ratio
        {
            tracing::trace!(
                last = self.last_weight,
                new = new_weight,
                accepted = self.n,
                "calibration: unstable, restarting window"
            );
            self.restart(now);
            self.last_weight = new_weight;
            return Verdict::Reset;
        }

        self.last_weight = new_weight;
        for (sum, v) in self.sums.iter_mut().zip(sample.corners()) {
            *sum += i64::from(v);
        }
        self.n += 1;
        self.abandon_at = now + self.cfg.abandon_after;
        Verdict::Accepted
    }

    /// Sums, count and stable window always restart together.
    fn restart(&mut self, now: Instant) {
        self.sums = [0; 4];
        self.n = 0;
        self.stable_at = now + self.cfg.stable_window;
    }

    pub fn poll(&self, now: Instant) -> CycleStatus {
        if self.n >= self.cfg.min_samples && now >= self.stable_at {
            // min_samples == 0 with nothing accepted has nothing to report
            return match self.weight() {
                Some(w) => CycleStatus::Converged(w),
                None => CycleStatus::Abandoned,
            };
        }
        if now >= self.abandon_at {
            return CycleStatus::Abandoned;
        }
        CycleStatus::Accumulating
    }

    /// Earliest instant at which `poll` may change its answer without a new sample.
    pub fn next_wakeup(&self) -> Instant {
        if self.n >= self.cfg.min_samples {
            self.stable_at.min(self.abandon_at)
        } else {
            self.abandon_at
        }
    }

    /// Mean corner sum over the accepted samples, truncated to whole units.
    pub fn weight(&self) -> Option<f64> {
        if self.n == 0 {
            return None;
        }
        let total: i64 = self.sums.iter().sum();
        Some((total / i64::from(self.n)) as f64)
    }

    pub fn accepted(&self) -> u32 {
        self.n
    }

    pub fn sums(&self) -> [i64; 4] {
        self.sums
    }

    pub fn stable_at(&self) -> Instant {
        self.stable_at
    }

    pub fn abandon_at(&self) -> Instant {
        self.abandon_at
    }
}

/// Runs calibration cycles on demand against the reader's sample channel.
pub struct Calibrator<C: Clock> {
    cfg: CalibrationCfg,
    state: Arc<CalibrationState>,
    samples: xch::Receiver<Sample>,
    weights: xch::Sender<f64>,
    clock: C,
}

impl<C: Clock> Calibrator<C> {
    pub fn new(
        cfg: CalibrationCfg,
        state: Arc<CalibrationState>,
        samples: xch::Receiver<Sample>,
        weights: xch::Sender<f64>,
        clock: C,
    ) -> Self {
        Self {
            cfg,
            state,
            samples,
            weights,
            clock,
        }
    }

    pub fn state(&self) -> &Arc<CalibrationState> {
        &self.state
    }

    /// Claim the shared state and run one cycle to convergence or abandonment.
    ///
    /// A no-op returning `NotClaimed` if another cycle is active.
    pub fn run_cycle(&self) -> CycleOutcome {
        if !self.state.try_claim() {
            tracing::debug!("calibration already in progress");
            return CycleOutcome::NotClaimed;
        }

        let started = self.clock.now();
        let mut cycle = CalibrationCycle::start(&self.cfg, started);
        tracing::debug!("calibration started");

        loop {
            let now = self.clock.now();
            match cycle.poll(now) {
                CycleStatus::Converged(weight) => {
                    self.state.converge(weight);
                    match self.weights.try_send(weight) {
                        Ok(()) => {}
                        Err(xch::TrySendError::Full(_)) => {
                            tracing::debug!(weight, "weight consumer not ready, dropped");
                        }
                        Err(xch::TrySendError::Disconnected(_)) => {
                            tracing::trace!("no weight consumer");
                        }
                    }
                    let samples = cycle.accepted();
                    tracing::info!(
                        weight,
                        samples,
                        elapsed_ms = self.clock.ms_since(started),
                        "calibrated"
                    );
                    return CycleOutcome::Converged { weight, samples };
                }
                CycleStatus::Abandoned => {
                    self.state.abandon();
                    tracing::debug!(
                        elapsed_ms = self.clock.ms_since(started),
                        "calibration abandoned"
                    );
                    return CycleOutcome::Abandoned;
                }
                CycleStatus::Accumulating => {}
            }

            let wait = cycle.next_wakeup().saturating_duration_since(now);
            match self.samples.recv_timeout(wait) {
                Ok(sample) => {
                    cycle.offer(&sample, self.clock.now());
                }
                Err(xch::RecvTimeoutError::Timeout) => {}
                Err(xch::RecvTimeoutError::Disconnected) => {
                    self.state.abandon();
                    tracing::debug!("sample stream closed during calibration");
                    return CycleOutcome::Abandoned;
                }
            }
        }
    }

    /// Engine thread body: run a cycle for each request until the reader goes
    /// away or `shutdown` is raised. A running cycle is never interrupted.
    pub fn serve(&self, requests: &CalibrationRequests, shutdown: &AtomicBool) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::debug!("calibration engine received shutdown signal");
                break;
            }
            match requests.receiver().recv_timeout(IDLE_POLL) {
                Ok(()) => {
                    let outcome = self.run_cycle();
                    tracing::trace!(?outcome, "calibration cycle finished");
                    let stale = requests.drain();
                    if stale > 0 {
                        tracing::trace!(stale, "dropped stale calibration requests");
                    }
                }
                Err(xch::RecvTimeoutError::Timeout) => {}
                Err(xch::RecvTimeoutError::Disconnected) => {
                    tracing::debug!("reader gone, calibration engine exiting");
                    break;
                }
            }
        }
        tracing::trace!("calibration engine exiting cleanly");
    }
}
