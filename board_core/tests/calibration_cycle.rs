//! Timing and filtering rules of a single calibration cycle, driven with
//! synthetic time so every scenario runs instantly.

use std::time::{Duration, Instant};

use board_core::{CalibrationCfg, CalibrationCycle, CalibrationState, CycleStatus, Sample, Verdict};
use board_traits::{Clock, ManualClock};
use rstest::rstest;

fn even(corner: i32) -> Sample {
    Sample::from_corners(corner, corner, corner, corner)
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Mirror of the engine loop: poll, then offer the next sample at its timestamp.
/// Returns the terminal status and when it was reached, or `None` if the script
/// ran out while still accumulating.
fn run_script(
    cfg: &CalibrationCfg,
    t0: Instant,
    script: &[(Duration, Sample)],
) -> Option<(CycleStatus, Instant)> {
    let mut cycle = CalibrationCycle::start(cfg, t0);
    for (at, sample) in script {
        let now = t0 + *at;
        // the engine wakes for deadlines that fall before the next sample
        let wake = cycle.next_wakeup();
        if wake <= now {
            match cycle.poll(wake) {
                CycleStatus::Accumulating => {}
                done => return Some((done, wake)),
            }
        }
        cycle.offer(sample, now);
        match cycle.poll(now) {
            CycleStatus::Accumulating => {}
            done => return Some((done, now)),
        }
    }
    None
}

/// `count` copies of `sample`, evenly spread over `span`.
fn steady(sample: Sample, count: u32, span: Duration) -> Vec<(Duration, Sample)> {
    (0..count)
        .map(|i| (span * i / count.max(1), sample))
        .collect()
}

#[test]
fn first_sample_of_a_cycle_restarts_the_window() {
    let clock = ManualClock::new();
    let mut cycle = CalibrationCycle::start(&CalibrationCfg::default(), clock.now());
    clock.advance(ms(500));
    assert_eq!(cycle.offer(&even(250), clock.now()), Verdict::Reset);
    assert_eq!(cycle.stable_at(), clock.now() + Duration::from_secs(3));
    assert_eq!(cycle.offer(&even(250), clock.now()), Verdict::Accepted);
}

#[rstest]
#[case(Sample::from_corners(0, 400, 400, 400))]
#[case(Sample::from_corners(400, 0, 400, 400))]
#[case(Sample::from_corners(400, 400, 0, 400))]
#[case(Sample::from_corners(400, 400, 400, 0))]
#[case(Sample::from_corners(0, 0, 0, 0))]
fn zero_corner_is_rejected_without_touching_accumulators(#[case] bad: Sample) {
    let clock = ManualClock::new();
    let mut cycle = CalibrationCycle::start(&CalibrationCfg::default(), clock.now());
    cycle.offer(&even(250), clock.now());
    cycle.offer(&even(250), clock.now());
    let (sums, n, stable_at) = (cycle.sums(), cycle.accepted(), cycle.stable_at());

    clock.advance(ms(10));
    assert_eq!(cycle.offer(&bad, clock.now()), Verdict::Rejected);
    assert_eq!(cycle.sums(), sums);
    assert_eq!(cycle.accepted(), n);
    assert_eq!(cycle.stable_at(), stable_at);

    // the rejected sample is not the new stability reference either
    assert_eq!(cycle.offer(&even(250), clock.now()), Verdict::Accepted);
}

#[rstest]
#[case::too_light(even(20))]
#[case::jump_up(even(400))]
#[case::drop_down(even(150))]
fn instability_resets_sums_count_and_window_together(#[case] jolt: Sample) {
    let clock = ManualClock::new();
    let mut cycle = CalibrationCycle::start(&CalibrationCfg::default(), clock.now());
    cycle.offer(&even(250), clock.now());
    for _ in 0..10 {
        clock.advance(ms(20));
        assert_eq!(cycle.offer(&even(250), clock.now()), Verdict::Accepted);
    }
    assert_eq!(cycle.accepted(), 10);

    clock.advance(ms(20));
    assert_eq!(cycle.offer(&jolt, clock.now()), Verdict::Reset);
    assert_eq!(cycle.sums(), [0; 4]);
    assert_eq!(cycle.accepted(), 0);
    assert_eq!(cycle.stable_at(), clock.now() + Duration::from_secs(3));
}

#[test]
fn step_is_measured_against_the_new_weight() {
    let clock = ManualClock::new();
    let mut cycle = CalibrationCycle::start(&CalibrationCfg::default(), clock.now());
    cycle.offer(&even(200), clock.now()); // reference 800
    // 800 -> 1000: |800-1000| / 1000 = 0.20, not above the limit
    assert_eq!(cycle.offer(&even(250), clock.now()), Verdict::Accepted);
    // 1000 -> 800: 200 / 800 = 0.25
    assert_eq!(cycle.offer(&even(200), clock.now()), Verdict::Reset);
}

#[test]
fn ninety_nine_samples_after_four_seconds_do_not_converge_but_the_hundredth_does() {
    let cfg = CalibrationCfg::default();
    let clock = ManualClock::new();
    let t0 = clock.now();
    let mut cycle = CalibrationCycle::start(&cfg, t0);
    assert_eq!(cycle.offer(&even(250), t0), Verdict::Reset);

    for _ in 0..99 {
        clock.advance(ms(40));
        assert_eq!(cycle.offer(&even(250), clock.now()), Verdict::Accepted);
    }
    clock.set_offset(Duration::from_secs(4));
    assert_eq!(cycle.accepted(), 99);
    assert_eq!(cycle.poll(clock.now()), CycleStatus::Accumulating);

    clock.advance(ms(10));
    assert_eq!(cycle.offer(&even(250), clock.now()), Verdict::Accepted);
    assert_eq!(cycle.poll(clock.now()), CycleStatus::Converged(1000.0));
}

#[test]
fn a_flood_of_samples_waits_for_the_stable_window() {
    let cfg = CalibrationCfg::default();
    let t0 = Instant::now();
    let mut cycle = CalibrationCycle::start(&cfg, t0);
    for i in 0..500u32 {
        cycle.offer(&even(250), t0 + ms(u64::from(i)));
    }
    assert_eq!(cycle.accepted(), 499);
    assert_eq!(cycle.poll(t0 + ms(2_999)), CycleStatus::Accumulating);
    assert_eq!(cycle.next_wakeup(), t0 + Duration::from_secs(3));
    assert_eq!(
        cycle.poll(t0 + Duration::from_secs(3)),
        CycleStatus::Converged(1000.0)
    );
}

#[test]
fn abandoned_when_nothing_arrives() {
    let t0 = Instant::now();
    let cycle = CalibrationCycle::start(&CalibrationCfg::default(), t0);
    assert_eq!(cycle.next_wakeup(), t0 + Duration::from_secs(5));
    assert_eq!(cycle.poll(t0 + ms(4_999)), CycleStatus::Accumulating);
    assert_eq!(cycle.poll(t0 + Duration::from_secs(5)), CycleStatus::Abandoned);
}

#[test]
fn rejected_samples_do_not_keep_a_cycle_alive() {
    let t0 = Instant::now();
    let script: Vec<_> = (0..200u32)
        .map(|i| (ms(u64::from(i) * 30), Sample::from_corners(0, 300, 300, 300)))
        .collect();
    let (status, at) = run_script(&CalibrationCfg::default(), t0, &script).expect("terminates");
    assert_eq!(status, CycleStatus::Abandoned);
    assert_eq!(at, t0 + Duration::from_secs(5));
}

#[test]
fn accepted_sample_rearms_abandonment() {
    let t0 = Instant::now();
    let mut cycle = CalibrationCycle::start(&CalibrationCfg::default(), t0);
    cycle.offer(&even(250), t0 + ms(100));
    cycle.offer(&even(250), t0 + Duration::from_secs(4));
    assert_eq!(cycle.abandon_at(), t0 + Duration::from_secs(9));
    assert_eq!(cycle.poll(t0 + ms(5_500)), CycleStatus::Accumulating);
    assert_eq!(cycle.poll(t0 + Duration::from_secs(9)), CycleStatus::Abandoned);
}

#[test]
fn final_weight_truncates_the_mean() {
    let cfg = CalibrationCfg {
        min_samples: 4,
        ..CalibrationCfg::default()
    };
    let t0 = Instant::now();
    let mut cycle = CalibrationCycle::start(&cfg, t0);
    cycle.offer(&Sample::from_corners(25, 25, 25, 25), t0);
    for s in [
        Sample::from_corners(25, 25, 25, 26),
        Sample::from_corners(25, 25, 25, 25),
        Sample::from_corners(25, 25, 25, 26),
        Sample::from_corners(25, 25, 25, 25),
    ] {
        assert_eq!(cycle.offer(&s, t0), Verdict::Accepted);
    }
    // (101 + 100 + 101 + 100) / 4 = 100.5
    assert_eq!(cycle.weight(), Some(100.0));
    assert_eq!(
        cycle.poll(t0 + Duration::from_secs(3)),
        CycleStatus::Converged(100.0)
    );
}

#[test]
fn light_steady_stream_converges_to_its_mean() {
    // 150 samples of 20 per corner over 3.5 s; the floor is lowered so an
    // 80-unit total counts as a load.
    let cfg = CalibrationCfg {
        min_weight: 50,
        ..CalibrationCfg::default()
    };
    let t0 = Instant::now();
    let script = steady(even(20), 150, ms(3_500));
    let (status, at) = run_script(&cfg, t0, &script).expect("converges");
    assert_eq!(status, CycleStatus::Converged(80.0));
    assert!(at >= t0 + Duration::from_secs(3));
    assert!(at <= t0 + ms(3_500));
}

#[test]
fn light_steady_stream_under_stock_floor_never_converges() {
    let t0 = Instant::now();
    let script = steady(even(20), 150, ms(3_500));
    assert_eq!(
        run_script(&CalibrationCfg::default(), t0, &script),
        None,
        "80 units is below the stock floor, every sample restarts the window"
    );
}

#[test]
fn loaded_steady_stream_converges_with_stock_settings() {
    let t0 = Instant::now();
    let script = steady(Sample::from_corners(310, 290, 205, 195), 150, ms(3_500));
    let (status, _) = run_script(&CalibrationCfg::default(), t0, &script).expect("converges");
    assert_eq!(status, CycleStatus::Converged(1000.0));
}

#[test]
fn stream_that_always_jumps_is_abandoned() {
    let t0 = Instant::now();
    let script: Vec<_> = (0..240u32)
        .map(|i| {
            let s = if i % 2 == 0 { even(125) } else { even(250) };
            (ms(u64::from(i) * 25), s)
        })
        .collect();
    let (status, at) = run_script(&CalibrationCfg::default(), t0, &script).expect("terminates");
    assert_eq!(status, CycleStatus::Abandoned);
    assert_eq!(at, t0 + Duration::from_secs(5));
}

#[test]
fn abandonment_keeps_previous_stable_weight_by_default() {
    let state = CalibrationState::with_weight(640.0);
    assert!(state.try_claim());
    let t0 = Instant::now();
    let cycle = CalibrationCycle::start(&CalibrationCfg::default(), t0);
    assert_eq!(cycle.poll(t0 + Duration::from_secs(5)), CycleStatus::Abandoned);
    state.abandon();
    let snap = state.snapshot();
    assert!(!snap.is_calibrating);
    assert_eq!(snap.last_stable_weight, 640.0);
}
