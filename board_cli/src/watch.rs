//! `board watch`: run the pipeline and print weights as they settle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use board_core::{Board, Sample};
use board_hardware::{BatteryGauge, EvdevDevice, SimulatedBoard, discover};
use board_traits::{Battery, EventSource};
use crossbeam_channel::RecvTimeoutError;
use eyre::{Result, WrapErr};

/// How often the loop re-checks Ctrl-C and reader liveness.
const TICK: Duration = Duration::from_millis(50);

pub struct WatchOpts {
    pub simulate: Option<i32>,
    pub samples: bool,
    pub count: Option<u64>,
    pub json: bool,
}

type Source = Box<dyn EventSource + Send>;
type Gauge = Box<dyn Battery + Send>;

fn open_source(cfg: &board_config::Config, simulate: Option<i32>) -> Result<(Source, Gauge)> {
    if let Some(total) = simulate {
        tracing::info!(total, "using simulated board");
        let sim = SimulatedBoard::new(total);
        return Ok((Box::new(sim.clone()), Box::new(sim)));
    }
    let found = discover(&cfg.device)?;
    let dev = EvdevDevice::open(&found.event_path)?;
    Ok((Box::new(dev), Box::new(BatteryGauge::new(found.battery_path))))
}

fn print_weight(weight: f64, battery: Option<u8>, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "event": "weight", "weight": weight, "battery_percent": battery })
        );
    } else {
        match battery {
            Some(b) => println!("weight: {weight:.0} (battery {b}%)"),
            None => println!("weight: {weight:.0}"),
        }
    }
}

fn print_sample(s: &Sample, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "sample",
                "top_left": s.top_left,
                "top_right": s.top_right,
                "bottom_left": s.bottom_left,
                "bottom_right": s.bottom_right,
                "total": s.total,
                "button": s.button_pressed,
            })
        );
    } else {
        println!(
            "sample: tl={} tr={} bl={} br={} total={:.0}{}",
            s.top_left,
            s.top_right,
            s.bottom_left,
            s.bottom_right,
            s.total,
            if s.button_pressed { " [button]" } else { "" }
        );
    }
}

pub fn run(cfg: &board_config::Config, opts: &WatchOpts) -> Result<()> {
    let (source, gauge) = open_source(cfg, opts.simulate)?;
    let board = Board::builder()
        .with_source(source)
        .with_config(cfg)
        .build()
        .wrap_err("assemble board")?;
    let handle = board.start().wrap_err("spawn board threads")?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        // A second handler registration (e.g. in tests) is harmless.
        let _ = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed));
    }

    let mut printed = 0u64;
    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::info!("interrupted, shutting down");
            handle.shutdown();
            return Ok(());
        }
        if opts.samples {
            for s in handle.samples().try_iter() {
                print_sample(&s, opts.json);
            }
        }
        match handle.weights().recv_timeout(TICK) {
            Ok(weight) => {
                let battery = match gauge.percent() {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::warn!(error = %e, "battery level unavailable");
                        None
                    }
                };
                print_weight(weight, battery, opts.json);
                printed += 1;
                if opts.count.is_some_and(|n| printed >= n) {
                    handle.shutdown();
                    return Ok(());
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if handle.is_finished() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::debug!(stats = ?handle.stats(), "reader stopped");
    // Only a fatal device error ends the reader on its own.
    handle.wait()?;
    Ok(())
}
