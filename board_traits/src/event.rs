//! Linux input-subsystem event model, reduced to what the balance board emits.

/// Cycle-boundary marker.
pub const EV_SYN: u16 = 0x00;
/// Key/button state change.
pub const EV_KEY: u16 = 0x01;
/// Absolute axis update (one pressure sensor).
pub const EV_ABS: u16 = 0x03;

/// End of one reporting cycle.
pub const SYN_REPORT: u16 = 0x00;
/// The kernel's event buffer overran; events since the last report were lost.
pub const SYN_DROPPED: u16 = 0x03;

pub const ABS_HAT0X: u16 = 0x10;
pub const ABS_HAT0Y: u16 = 0x11;
pub const ABS_HAT1X: u16 = 0x12;
pub const ABS_HAT1Y: u16 = 0x13;

/// The board's single front button.
pub const BTN_A: u16 = 0x130;

/// One raw event as delivered by the input subsystem (timestamp dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    #[inline]
    pub const fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    #[inline]
    pub const fn abs(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    #[inline]
    pub const fn key(code: u16, value: i32) -> Self {
        Self::new(EV_KEY, code, value)
    }

    #[inline]
    pub const fn sync() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }
}

/// Pressure sensor position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Map an absolute-axis code to the sensor it reports.
    pub fn from_abs_code(code: u16) -> Option<Self> {
        match code {
            ABS_HAT1X => Some(Corner::TopLeft),
            ABS_HAT0X => Some(Corner::TopRight),
            ABS_HAT1Y => Some(Corner::BottomLeft),
            ABS_HAT0Y => Some(Corner::BottomRight),
            _ => None,
        }
    }

    pub const fn abs_code(self) -> u16 {
        match self {
            Corner::TopLeft => ABS_HAT1X,
            Corner::TopRight => ABS_HAT0X,
            Corner::BottomLeft => ABS_HAT1Y,
            Corner::BottomRight => ABS_HAT0Y,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}
