//! Calibration engine against real channels and real time, with windows
//! shortened so each test finishes well under a second.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use board_core::trigger;
use board_core::{CalibrationCfg, CalibrationState, Calibrator, CycleOutcome, Sample};
use board_traits::MonotonicClock;
use crossbeam_channel as xch;

fn quick_cfg() -> CalibrationCfg {
    CalibrationCfg {
        stable_window: Duration::from_millis(150),
        abandon_after: Duration::from_millis(300),
        min_samples: 20,
        ..CalibrationCfg::default()
    }
}

struct Rig {
    calibrator: Calibrator<MonotonicClock>,
    samples_tx: xch::Sender<Sample>,
    weights_rx: xch::Receiver<f64>,
    state: Arc<CalibrationState>,
}

fn rig(state: CalibrationState) -> Rig {
    let state = Arc::new(state);
    let (samples_tx, samples_rx) = xch::bounded(1);
    let (weights_tx, weights_rx) = xch::bounded(1);
    let calibrator = Calibrator::new(
        quick_cfg(),
        Arc::clone(&state),
        samples_rx,
        weights_tx,
        MonotonicClock::new(),
    );
    Rig {
        calibrator,
        samples_tx,
        weights_rx,
        state,
    }
}

/// Push `sample` every `every` until the returned sender is dropped.
fn feeder(tx: xch::Sender<Sample>, sample: Sample, every: Duration) -> xch::Sender<()> {
    let (stop_tx, stop_rx) = xch::bounded::<()>(0);
    thread::spawn(move || {
        while let Err(xch::TryRecvError::Empty) = stop_rx.try_recv() {
            // a full slot just means the engine is idle
            let _ = tx.send_timeout(sample, every);
            thread::sleep(every);
        }
    });
    stop_tx
}

#[test]
fn converges_publishes_and_releases_state() {
    let r = rig(CalibrationState::with_weight(10.0));
    let _stop = feeder(
        r.samples_tx.clone(),
        Sample::from_corners(260, 240, 255, 245),
        Duration::from_millis(2),
    );

    let started = Instant::now();
    let outcome = r.calibrator.run_cycle();
    match outcome {
        CycleOutcome::Converged { weight, samples } => {
            assert_eq!(weight, 1000.0);
            assert!(samples >= 20);
        }
        other => panic!("expected convergence, got {other:?}"),
    }
    assert!(started.elapsed() >= Duration::from_millis(150));

    assert_eq!(r.weights_rx.try_recv(), Ok(1000.0));
    let snap = r.state.snapshot();
    assert!(!snap.is_calibrating);
    assert_eq!(snap.last_stable_weight, 1000.0);
}

#[test]
fn silent_stream_is_abandoned_and_weight_kept() {
    let r = rig(CalibrationState::with_weight(777.0));
    let started = Instant::now();
    assert_eq!(r.calibrator.run_cycle(), CycleOutcome::Abandoned);
    let took = started.elapsed();
    assert!(took >= Duration::from_millis(300), "abandoned too early: {took:?}");
    assert!(took < Duration::from_secs(2), "abandoned too late: {took:?}");

    assert!(r.weights_rx.try_recv().is_err(), "no weight on abandonment");
    let snap = r.state.snapshot();
    assert!(!snap.is_calibrating);
    assert_eq!(snap.last_stable_weight, 777.0);
}

#[test]
fn legacy_mode_leaves_zero_after_abandonment() {
    let r = rig(CalibrationState::with_weight(777.0).reset_weight_on_claim(true));
    assert_eq!(r.calibrator.run_cycle(), CycleOutcome::Abandoned);
    assert_eq!(r.state.last_stable_weight(), 0.0);
}

#[test]
fn unstable_stream_is_abandoned() {
    let r = rig(CalibrationState::new());
    let tx = r.samples_tx.clone();
    let (stop_tx, stop_rx) = xch::bounded::<()>(0);
    thread::spawn(move || {
        let mut high = false;
        while let Err(xch::TryRecvError::Empty) = stop_rx.try_recv() {
            let c = if high { 250 } else { 100 };
            high = !high;
            let _ = tx.send_timeout(Sample::from_corners(c, c, c, c), Duration::from_millis(5));
            thread::sleep(Duration::from_millis(2));
        }
    });
    assert_eq!(r.calibrator.run_cycle(), CycleOutcome::Abandoned);
    drop(stop_tx);
    assert!(r.weights_rx.try_recv().is_err());
    assert!(!r.state.is_calibrating());
}

#[test]
fn active_cycle_makes_new_invocations_noops() {
    let state = CalibrationState::new();
    assert!(state.try_claim());
    let r = rig(state);
    assert_eq!(r.calibrator.run_cycle(), CycleOutcome::NotClaimed);
    assert!(r.state.is_calibrating(), "the owner keeps its claim");
}

#[test]
fn concurrent_triggers_yield_exactly_one_cycle() {
    const N: usize = 8;
    let state = Arc::new(CalibrationState::new());
    let (_samples_tx, samples_rx) = xch::bounded::<Sample>(1);
    let (weights_tx, _weights_rx) = xch::bounded::<f64>(1);
    let barrier = Arc::new(Barrier::new(N));

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let c = Calibrator::new(
                quick_cfg(),
                Arc::clone(&state),
                samples_rx.clone(),
                weights_tx.clone(),
                MonotonicClock::new(),
            );
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait();
                c.run_cycle()
            })
        })
        .collect();

    let outcomes: Vec<CycleOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let ran = outcomes
        .iter()
        .filter(|o| **o != CycleOutcome::NotClaimed)
        .count();
    assert_eq!(ran, 1, "outcomes: {outcomes:?}");
    assert!(!state.is_calibrating());
}

#[test]
fn concurrent_claims_succeed_exactly_once() {
    const N: usize = 32;
    let state = Arc::new(CalibrationState::new());
    let barrier = Arc::new(Barrier::new(N));
    let wins: usize = (0..N)
        .map(|_| {
            let s = Arc::clone(&state);
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait();
                s.try_claim()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| usize::from(h.join().unwrap()))
        .sum();
    assert_eq!(wins, 1);
}

#[test]
fn serve_runs_a_cycle_per_request_and_exits_with_the_reader() {
    let r = rig(CalibrationState::new());
    let (trigger, requests) = trigger::channel();
    let Rig {
        calibrator,
        samples_tx,
        weights_rx,
        state,
    } = r;
    let engine = thread::spawn(move || calibrator.serve(&requests, &AtomicBool::new(false)));

    let stop = feeder(
        samples_tx,
        Sample::from_corners(100, 100, 100, 100),
        Duration::from_millis(2),
    );
    assert!(trigger.request());
    let w = weights_rx
        .recv_timeout(Duration::from_secs(3))
        .expect("a weight is published");
    assert_eq!(w, 400.0);
    assert_eq!(state.last_stable_weight(), 400.0);

    drop(stop);
    drop(trigger);
    engine.join().expect("engine exits once the trigger side is gone");
}

#[test]
fn serve_honours_shutdown_while_idle() {
    let r = rig(CalibrationState::new());
    let (_trigger, requests) = trigger::channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let calibrator = r.calibrator;
    let engine = thread::spawn(move || calibrator.serve(&requests, &flag));
    thread::sleep(Duration::from_millis(20));
    shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    let started = Instant::now();
    engine.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}
