use thiserror::Error;

/// Failures that escape the core. Steady-state anomalies never do.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The board went away; there is no recovery path.
    #[error("device disconnected: {0}")]
    Disconnected(String),
    /// Reading the device failed for another reason; also fatal.
    #[error("device read failed: {0}")]
    DeviceRead(String),
    #[error("invalid state: {0}")]
    State(String),
}

impl BoardError {
    /// Whether the reader loop had to stop because of this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BoardError::Disconnected(_) | BoardError::DeviceRead(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing event source")]
    MissingSource,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
