//! Raw event reader: assembles per-cycle Samples from the device and decides
//! which of them reach the calibration engine.
//!
//! The reader never blocks on anything but the device itself. Hand-offs to the
//! engine and to consumers are `try_send`; a Sample that cannot be delivered
//! right away is dropped.
use crate::config::ReaderCfg;
use crate::error::BoardError;
use crate::hw_error::map_read_error;
use crate::sample::{Sample, SampleBuilder};
use crate::state::CalibrationState;
use crate::status::Dispatch;
use crate::trigger::CalibrationTrigger;
use board_traits::event::{BTN_A, EV_ABS, EV_KEY, EV_SYN, SYN_DROPPED};
use board_traits::{Corner, EventSource, InputEvent};
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Whether `total` has drifted from `last_stable` by more than `ratio`.
///
/// With no stable weight yet, any nonzero total counts as drift.
#[inline]
pub fn deviates(total: f64, last_stable: f64, ratio: f64) -> bool {
    if last_stable == 0.0 {
        return total != 0.0;
    }
    (total - last_stable).abs() / last_stable.abs() > ratio
}

/// Lock-free counters kept by the reader loop.
#[derive(Debug, Default)]
pub struct ReaderStats {
    batches: AtomicU64,
    short_batches: AtomicU64,
    unknown_events: AtomicU64,
    incomplete: AtomicU64,
    recalibrations: AtomicU64,
    below_floor: AtomicU64,
    forwarded: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`ReaderStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReaderCounts {
    pub batches: u64,
    pub short_batches: u64,
    pub unknown_events: u64,
    pub incomplete: u64,
    pub recalibrations: u64,
    pub below_floor: u64,
    pub forwarded: u64,
    pub dropped: u64,
}

impl ReaderStats {
    pub fn counts(&self) -> ReaderCounts {
        ReaderCounts {
            batches: self.batches.load(Ordering::Relaxed),
            short_batches: self.short_batches.load(Ordering::Relaxed),
            unknown_events: self.unknown_events.load(Ordering::Relaxed),
            incomplete: self.incomplete.load(Ordering::Relaxed),
            recalibrations: self.recalibrations.load(Ordering::Relaxed),
            below_floor: self.below_floor.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn record(&self, d: Dispatch) {
        let counter = match d {
            Dispatch::Incomplete => &self.incomplete,
            Dispatch::Recalibrate => &self.recalibrations,
            Dispatch::BelowFloor => &self.below_floor,
            Dispatch::Forwarded => &self.forwarded,
            Dispatch::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct Reader<S: EventSource> {
    source: S,
    cfg: ReaderCfg,
    state: Arc<CalibrationState>,
    trigger: CalibrationTrigger,
    engine_tx: xch::Sender<Sample>,
    tap_tx: Option<xch::Sender<Sample>>,
    current: SampleBuilder,
    stats: Arc<ReaderStats>,
}

impl<S: EventSource> Reader<S> {
    pub fn new(
        source: S,
        cfg: ReaderCfg,
        state: Arc<CalibrationState>,
        trigger: CalibrationTrigger,
        engine_tx: xch::Sender<Sample>,
    ) -> Self {
        Self {
            source,
            cfg,
            state,
            trigger,
            engine_tx,
            tap_tx: None,
            current: SampleBuilder::new(),
            stats: Arc::new(ReaderStats::default()),
        }
    }

    /// Also copy every Sample that passes the gate to `tap`, dropping when it is full.
    pub fn with_tap(mut self, tap: xch::Sender<Sample>) -> Self {
        self.tap_tx = Some(tap);
        self
    }

    pub fn stats(&self) -> Arc<ReaderStats> {
        Arc::clone(&self.stats)
    }

    /// Read batches until the device fails or `shutdown` is raised.
    ///
    /// A read failure means the board is gone and is returned as a fatal error;
    /// the caller decides whether to exit or rebuild the whole pipeline.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), BoardError> {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::debug!("reader received shutdown signal");
                return Ok(());
            }
            match self.source.read_batch() {
                Ok(events) => self.handle_batch(&events),
                Err(e) => {
                    let err = map_read_error(&*e);
                    tracing::error!(error = %err, "reading events failed");
                    return Err(err);
                }
            }
        }
    }

    pub fn handle_batch(&mut self, events: &[InputEvent]) {
        self.stats.batches.fetch_add(1, Ordering::Relaxed);
        if events.len() < self.cfg.min_batch_len {
            self.stats.short_batches.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(len = events.len(), "incomplete batch skipped");
            return;
        }
        for ev in events {
            self.handle_event(ev);
        }
    }

    /// Apply one event. Returns what happened to the Sample at a cycle boundary.
    pub fn handle_event(&mut self, ev: &InputEvent) -> Option<Dispatch> {
        match ev.kind {
            EV_SYN if ev.code == SYN_DROPPED => {
                tracing::debug!("kernel dropped events, discarding partial sample");
                self.current = SampleBuilder::new();
                None
            }
            EV_SYN => Some(self.flush()),
            EV_ABS => {
                match Corner::from_abs_code(ev.code) {
                    Some(corner) => self.current.set_corner(corner, ev.value),
                    None => self.unexpected(ev),
                }
                None
            }
            EV_KEY => {
                if ev.code == BTN_A {
                    self.current.press_button();
                } else {
                    self.unexpected(ev);
                }
                None
            }
            _ => {
                self.unexpected(ev);
                None
            }
        }
    }

    fn unexpected(&self, ev: &InputEvent) {
        self.stats.unknown_events.fetch_add(1, Ordering::Relaxed);
        tracing::info!(kind = ev.kind, code = ev.code, value = ev.value, "unexpected event");
    }

    fn flush(&mut self) -> Dispatch {
        let d = match self.current.take() {
            Some(sample) => self.dispatch(sample),
            None => Dispatch::Incomplete,
        };
        self.stats.record(d);
        d
    }

    fn dispatch(&self, sample: Sample) -> Dispatch {
        // The read lock is held only inside snapshot().
        let snap = self.state.snapshot();
        if !snap.is_calibrating {
            if deviates(sample.total, snap.last_stable_weight, self.cfg.deviation_ratio) {
                if self.trigger.request() {
                    tracing::debug!(
                        total = sample.total,
                        last = snap.last_stable_weight,
                        "weight drifted, requesting calibration"
                    );
                }
                return Dispatch::Recalibrate;
            }
            if sample.total < self.cfg.min_total {
                return Dispatch::BelowFloor;
            }
        }
        if let Some(tap) = &self.tap_tx {
            let _ = tap.try_send(sample);
        }
        match self.engine_tx.try_send(sample) {
            Ok(()) => Dispatch::Forwarded,
            Err(_) => Dispatch::Dropped,
        }
    }
}
