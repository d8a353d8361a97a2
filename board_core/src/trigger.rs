//! Single-slot calibration request signal between the reader and the engine.
use crossbeam_channel as xch;

/// Reader side: fire-and-forget requests that coalesce while one is pending.
#[derive(Debug, Clone)]
pub struct CalibrationTrigger {
    tx: xch::Sender<()>,
}

/// Engine side.
#[derive(Debug, Clone)]
pub struct CalibrationRequests {
    rx: xch::Receiver<()>,
}

pub fn channel() -> (CalibrationTrigger, CalibrationRequests) {
    let (tx, rx) = xch::bounded(1);
    (CalibrationTrigger { tx }, CalibrationRequests { rx })
}

impl CalibrationTrigger {
    /// Returns `true` if this call queued a new request, `false` if one was
    /// already pending or the engine is gone. Never blocks.
    pub fn request(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

impl CalibrationRequests {
    pub(crate) fn receiver(&self) -> &xch::Receiver<()> {
        &self.rx
    }

    /// Whether a request is waiting.
    pub fn is_pending(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Drop requests raised while a cycle was already running.
    pub fn drain(&self) -> usize {
        self.rx.try_iter().count()
    }
}
