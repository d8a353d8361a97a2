pub mod clock;
pub mod event;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use event::{Corner, InputEvent};

/// A connection to the board that yields batches of low-level input events.
///
/// `read_batch` blocks until at least one event is available. Any error is
/// treated by callers as a disconnect.
pub trait EventSource {
    fn read_batch(&mut self) -> Result<Vec<InputEvent>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Remaining charge of the board, in percent.
pub trait Battery {
    fn percent(&self) -> Result<u8, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: EventSource + ?Sized> EventSource for Box<T> {
    fn read_batch(&mut self) -> Result<Vec<InputEvent>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_batch()
    }
}
