//! Maps `Box<dyn Error>` from the `EventSource` boundary to a typed `BoardError`.
//!
//! The traits in `board_traits` use `Box<dyn Error + Send + Sync>` so any
//! device backend can plug in; this module turns those into our error enum,
//! with an optional feature-gated path for `board_hardware::HwError`.

use crate::error::BoardError;

/// Map a device read failure to a typed `BoardError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_read_error(e: &(dyn std::error::Error + 'static)) -> BoardError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<board_hardware::error::HwError>() {
            return match hw {
                board_hardware::error::HwError::Disconnected => {
                    BoardError::Disconnected(hw.to_string())
                }
                other => BoardError::DeviceRead(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("disconnect") {
        BoardError::Disconnected(s)
    } else {
        BoardError::DeviceRead(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_fallback_detects_disconnects() {
        let e = std::io::Error::other("Device Disconnected");
        assert!(matches!(map_read_error(&e), BoardError::Disconnected(_)));
        let e = std::io::Error::other("permission denied");
        assert!(matches!(map_read_error(&e), BoardError::DeviceRead(_)));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_mapped() {
        use board_hardware::error::HwError;
        assert_eq!(
            map_read_error(&HwError::Disconnected),
            BoardError::Disconnected("device disconnected".into())
        );
        let io = HwError::Io(std::io::Error::other("boom"));
        assert!(matches!(map_read_error(&io), BoardError::DeviceRead(_)));
    }
}
