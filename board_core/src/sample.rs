//! One reporting cycle of the board and the in-progress accumulator that builds it.

use board_traits::Corner;

/// Aggregated sensor state for one reporting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub top_left: i32,
    pub top_right: i32,
    pub bottom_left: i32,
    pub bottom_right: i32,
    /// Sum of the four corners.
    pub total: f64,
    pub button_pressed: bool,
}

impl Sample {
    /// Build a sample from the four corners, computing the total.
    pub fn from_corners(
        top_left: i32,
        top_right: i32,
        bottom_left: i32,
        bottom_right: i32,
    ) -> Self {
        let mut s = Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            ..Self::default()
        };
        s.total = s.corner_sum() as f64;
        s
    }

    /// Corners in `Corner::index` order.
    #[inline]
    pub fn corners(&self) -> [i32; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Integer sum of the corners; 64-bit so four full-scale readings cannot overflow.
    #[inline]
    pub fn corner_sum(&self) -> i64 {
        self.corners().iter().map(|&v| i64::from(v)).sum()
    }

    #[inline]
    pub fn has_zero_corner(&self) -> bool {
        self.corners().contains(&0)
    }
}

/// Mutable Sample under construction between two cycle-boundary events.
#[derive(Debug, Default, Clone)]
pub struct SampleBuilder {
    sample: Sample,
    seen: u8,
}

impl SampleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_corner(&mut self, corner: Corner, value: i32) {
        match corner {
            Corner::TopLeft => self.sample.top_left = value,
            Corner::TopRight => self.sample.top_right = value,
            Corner::BottomLeft => self.sample.bottom_left = value,
            Corner::BottomRight => self.sample.bottom_right = value,
        }
        self.seen |= 1 << corner.index();
        self.sample.total = self.sample.corner_sum() as f64;
    }

    pub fn press_button(&mut self) {
        self.sample.button_pressed = true;
    }

    /// All four corners have been set since the last flush.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.seen == 0b1111
    }

    /// Current (possibly partial) state.
    pub fn peek(&self) -> &Sample {
        &self.sample
    }

    /// Flush: yields the Sample only if complete. The builder is reset either way.
    pub fn take(&mut self) -> Option<Sample> {
        let done = std::mem::take(self);
        done.is_complete().then_some(done.sample)
    }
}
