use std::io::Cursor;

use board_hardware::evdev::{EvdevDevice, RECORD_LEN, encode_events};
use board_hardware::{HwError, decode_events};
use board_traits::event::{ABS_HAT0X, ABS_HAT0Y, ABS_HAT1X, ABS_HAT1Y, BTN_A};
use board_traits::{EventSource, InputEvent};

fn cycle(tl: i32, tr: i32, bl: i32, br: i32) -> Vec<InputEvent> {
    vec![
        InputEvent::abs(ABS_HAT1X, tl),
        InputEvent::abs(ABS_HAT0X, tr),
        InputEvent::abs(ABS_HAT1Y, bl),
        InputEvent::abs(ABS_HAT0Y, br),
        InputEvent::sync(),
    ]
}

#[test]
fn decodes_what_the_kernel_writes() {
    let mut events = cycle(310, 290, 205, 195);
    events.insert(0, InputEvent::key(BTN_A, 1));
    let raw = encode_events(&events);
    assert_eq!(raw.len(), events.len() * RECORD_LEN);
    assert_eq!(decode_events(&raw), events);
}

#[test]
fn reads_in_bounded_batches_until_eof() {
    // 100 records: one full read of 64, then the remaining 36
    let events: Vec<InputEvent> = (0..20).flat_map(|i| cycle(i, i, i, i)).collect();
    let mut dev = EvdevDevice::from_reader("mem".into(), Cursor::new(encode_events(&events)));

    let first = dev.read_batch().unwrap();
    let second = dev.read_batch().unwrap();
    assert_eq!(first.len(), 64);
    assert_eq!(second.len(), 36);
    assert_eq!([first, second].concat(), events);

    let err = dev.read_batch().unwrap_err();
    assert!(matches!(err.downcast_ref::<HwError>(), Some(HwError::Disconnected)));
}

#[test]
fn open_missing_node_is_io() {
    let tmp = tempfile::tempdir().unwrap();
    let err = EvdevDevice::open(tmp.path().join("event99")).err().unwrap();
    assert!(matches!(err, HwError::Io(_)));
}
