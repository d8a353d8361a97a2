//! Test and helper mocks for board_core

use board_traits::{Corner, EventSource, InputEvent};
use std::collections::VecDeque;
use std::time::Duration;

/// One complete reporting cycle: the four corners followed by a sync.
pub fn frame(
    top_left: i32,
    top_right: i32,
    bottom_left: i32,
    bottom_right: i32,
) -> Vec<InputEvent> {
    let values = [top_left, top_right, bottom_left, bottom_right];
    let mut out: Vec<InputEvent> = Corner::ALL
        .into_iter()
        .zip(values)
        .map(|(c, v)| InputEvent::abs(c.abs_code(), v))
        .collect();
    out.push(InputEvent::sync());
    out
}

/// A frame whose corners are all `corner`.
pub fn even_frame(corner: i32) -> Vec<InputEvent> {
    frame(corner, corner, corner, corner)
}

/// Plays back prepared batches, then reports a disconnect.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    batches: VecDeque<Vec<InputEvent>>,
    pace: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(batches: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
            pace: None,
        }
    }

    /// Sleep this long before handing out each batch, like a device would.
    pub fn paced(mut self, every: Duration) -> Self {
        self.pace = Some(every);
        self
    }
}

impl EventSource for ScriptedSource {
    fn read_batch(&mut self) -> Result<Vec<InputEvent>, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(d) = self.pace {
            std::thread::sleep(d);
        }
        self.batches
            .pop_front()
            .ok_or_else(|| std::io::Error::other("scripted device disconnected").into())
    }
}
