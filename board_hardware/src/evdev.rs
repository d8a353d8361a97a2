//! Linux evdev character devices (`/dev/input/eventN`).
//!
//! A read returns whole `struct input_event` records: a `timeval` followed by
//! the u16 type, the u16 code and the i32 value, all in native byte order.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use board_traits::{EventSource, InputEvent};

use crate::error::{HwError, Result};

/// Records requested per `read(2)`.
pub const BATCH_RECORDS: usize = 64;

const TIME_LEN: usize = std::mem::size_of::<libc::timeval>();
/// Size of one kernel `input_event` record on this platform.
pub const RECORD_LEN: usize = TIME_LEN + 2 + 2 + 4;

/// Decode raw `input_event` records. A trailing partial record is ignored.
pub fn decode_events(buf: &[u8]) -> Vec<InputEvent> {
    buf.chunks_exact(RECORD_LEN)
        .map(|rec| {
            let body = &rec[TIME_LEN..];
            InputEvent::new(
                u16::from_ne_bytes([body[0], body[1]]),
                u16::from_ne_bytes([body[2], body[3]]),
                i32::from_ne_bytes([body[4], body[5], body[6], body[7]]),
            )
        })
        .collect()
}

/// Encode events the way the kernel lays them out, with a zero timestamp.
pub fn encode_events(events: &[InputEvent]) -> Vec<u8> {
    let mut out = Vec::with_capacity(events.len() * RECORD_LEN);
    for ev in events {
        out.extend_from_slice(&[0u8; TIME_LEN]);
        out.extend_from_slice(&ev.kind.to_ne_bytes());
        out.extend_from_slice(&ev.code.to_ne_bytes());
        out.extend_from_slice(&ev.value.to_ne_bytes());
    }
    out
}

pub struct EvdevDevice<R = File> {
    path: PathBuf,
    inner: R,
    buf: Vec<u8>,
}

impl EvdevDevice<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        tracing::info!(path = %path.display(), "opened balance board");
        Ok(Self::from_reader(path, file))
    }
}

impl<R: Read> EvdevDevice<R> {
    /// Wrap any byte stream carrying `input_event` records.
    pub fn from_reader(path: PathBuf, inner: R) -> Self {
        Self {
            path,
            inner,
            buf: vec![0; BATCH_RECORDS * RECORD_LEN],
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One blocking read of up to [`BATCH_RECORDS`] events.
    pub fn read_events(&mut self) -> Result<Vec<InputEvent>> {
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(0) => return Err(HwError::Disconnected),
                Ok(n) => return Ok(decode_events(&self.buf[..n])),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                    return Err(HwError::Disconnected);
                }
                Err(e) => return Err(HwError::Io(e)),
            }
        }
    }
}

impl<R: Read> EventSource for EvdevDevice<R> {
    fn read_batch(
        &mut self,
    ) -> std::result::Result<Vec<InputEvent>, Box<dyn std::error::Error + Send + Sync>> {
        self.read_events().map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "evdev read failed");
            e.into()
        })
    }
}
