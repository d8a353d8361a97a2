//! Spawns the reader and calibration engine threads for a built `Board`.
//!
//! Each `BoardHandle` owns exactly two threads. The engine thread is joined
//! when the handle is dropped. The reader thread may be parked inside a
//! blocking device read; it is joined only if it has already finished and is
//! otherwise left to exit on its next read.
use crate::builder::Board;
use crate::calibration::Calibrator;
use crate::error::BoardError;
use crate::reader::{Reader, ReaderCounts, ReaderStats};
use crate::sample::Sample;
use crate::state::CalibrationState;
use crate::trigger;
use board_traits::{Clock, EventSource};
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

pub struct BoardHandle {
    weights: xch::Receiver<f64>,
    samples: xch::Receiver<Sample>,
    state: Arc<CalibrationState>,
    stats: Arc<ReaderStats>,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<Result<(), BoardError>>>,
    engine: Option<JoinHandle<()>>,
}

impl<S, C> Board<S, C>
where
    S: EventSource + Send + 'static,
    C: Clock + Send + 'static,
{
    /// Start reading and calibrating in the background.
    pub fn start(self) -> std::io::Result<BoardHandle> {
        let state = Arc::new(
            CalibrationState::with_weight(self.initial_weight)
                .reset_weight_on_claim(self.calibration.reset_weight_on_claim),
        );
        let shutdown = Arc::new(AtomicBool::new(false));

        // Rendezvous: a sample reaches the engine only if it is blocked waiting for
        // one, so nothing goes stale while it is idle.
        let (engine_tx, engine_rx) = xch::bounded::<Sample>(0);
        let (tap_tx, tap_rx) = xch::bounded::<Sample>(self.output.sample_buffer);
        let (weight_tx, weight_rx) = xch::bounded::<f64>(self.output.weight_buffer);
        let (trigger, requests) = trigger::channel();

        let calibrator = Calibrator::new(
            self.calibration,
            Arc::clone(&state),
            engine_rx,
            weight_tx,
            self.clock,
        );
        let engine_shutdown = Arc::clone(&shutdown);
        let engine = std::thread::Builder::new()
            .name("board-calibration".into())
            .spawn(move || calibrator.serve(&requests, &engine_shutdown))?;

        let mut reader = Reader::new(
            self.source,
            self.reader,
            Arc::clone(&state),
            trigger,
            engine_tx,
        )
        .with_tap(tap_tx);
        let stats = reader.stats();
        let reader_shutdown = Arc::clone(&shutdown);
        let reader = match std::thread::Builder::new()
            .name("board-reader".into())
            .spawn(move || reader.run(&reader_shutdown))
        {
            Ok(h) => h,
            Err(e) => {
                shutdown.store(true, Ordering::Relaxed);
                let _ = engine.join();
                return Err(e);
            }
        };

        tracing::debug!("board pipeline started");
        Ok(BoardHandle {
            weights: weight_rx,
            samples: tap_rx,
            state,
            stats,
            shutdown,
            reader: Some(reader),
            engine: Some(engine),
        })
    }
}

impl BoardHandle {
    /// Calibrated weights, one per converged cycle.
    pub fn weights(&self) -> &xch::Receiver<f64> {
        &self.weights
    }

    /// Every complete raw Sample, best effort.
    pub fn samples(&self) -> &xch::Receiver<Sample> {
        &self.samples
    }

    pub fn state(&self) -> &Arc<CalibrationState> {
        &self.state
    }

    pub fn stats(&self) -> ReaderCounts {
        self.stats.counts()
    }

    /// Ask both loops to stop at their next opportunity.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Whether the reader loop has ended (disconnect or shutdown).
    pub fn is_finished(&self) -> bool {
        self.reader.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Block until the reader loop ends and return its result.
    ///
    /// `Err` carries the fatal device error that stopped it.
    pub fn wait(mut self) -> Result<(), BoardError> {
        let res = match self.reader.take() {
            Some(h) => h
                .join()
                .unwrap_or_else(|_| Err(BoardError::State("reader thread panicked".into()))),
            None => Ok(()),
        };
        self.shutdown();
        res
    }
}

impl Drop for BoardHandle {
    fn drop(&mut self) {
        self.shutdown();

        // The engine exits within one idle poll, or once an active cycle ends.
        if let Some(handle) = self.engine.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("calibration thread joined"),
                Err(e) => tracing::warn!(?e, "calibration thread panicked during shutdown"),
            }
        }

        if let Some(handle) = self.reader.take() {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    tracing::warn!(?e, "reader thread panicked during shutdown");
                }
            } else {
                tracing::debug!("reader blocked in device read, detaching");
            }
        }
    }
}
