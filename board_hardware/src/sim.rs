//! A stand-in board for running without hardware.

use std::time::Duration;

use board_traits::{Battery, Clock, Corner, EventSource, InputEvent, MonotonicClock};

use crate::error::HwError;

/// Produces one reporting cycle per read: the load split over the four
/// corners with a unit or two of deterministic jitter, then a sync.
#[derive(Debug, Clone)]
pub struct SimulatedBoard<C: Clock = MonotonicClock> {
    total: i32,
    period: Duration,
    clock: C,
    frames_left: Option<u64>,
    battery: u8,
    rng: u32,
}

impl SimulatedBoard<MonotonicClock> {
    /// Someone weighing `total` raw units, reported every 10 ms.
    pub fn new(total: i32) -> Self {
        Self::with_clock(total, MonotonicClock::new())
    }
}

impl<C: Clock> SimulatedBoard<C> {
    pub fn with_clock(total: i32, clock: C) -> Self {
        Self {
            total: total.max(0),
            period: Duration::from_millis(10),
            clock,
            frames_left: None,
            battery: 100,
            rng: 0x9E37_79B9,
        }
    }

    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Disconnect after this many frames.
    pub fn frames(mut self, n: u64) -> Self {
        self.frames_left = Some(n);
        self
    }

    pub fn battery(mut self, percent: u8) -> Self {
        self.battery = percent.min(100);
        self
    }

    fn jitter(&mut self) -> i32 {
        // xorshift32
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x % 3) as i32 - 1
    }

    /// The next frame's corner values, in `Corner::index` order.
    pub fn next_corners(&mut self) -> [i32; 4] {
        let quarter = self.total / 4;
        let mut corners = [quarter; 4];
        corners[0] += self.total - quarter * 4;
        if self.total > 0 {
            for c in &mut corners {
                // never let jitter produce a zero corner under load
                *c = (*c + self.jitter()).max(1);
            }
        }
        corners
    }
}

impl<C: Clock> EventSource for SimulatedBoard<C> {
    fn read_batch(&mut self) -> Result<Vec<InputEvent>, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return Err(HwError::Disconnected.into());
            }
            *left -= 1;
        }
        self.clock.sleep(self.period);
        let corners = self.next_corners();
        let mut events: Vec<InputEvent> = Corner::ALL
            .into_iter()
            .map(|c| InputEvent::abs(c.abs_code(), corners[c.index()]))
            .collect();
        events.push(InputEvent::sync());
        Ok(events)
    }
}

impl<C: Clock> Battery for SimulatedBoard<C> {
    fn percent(&self) -> Result<u8, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.battery)
    }
}
