#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Raw reads from the event node and the device listing are untrusted text.
    let events = board_hardware::decode_events(data);
    assert!(events.len() <= data.len() / board_hardware::evdev::RECORD_LEN);

    if let Ok(listing) = std::str::from_utf8(data) {
        let _ = board_hardware::discovery::find_in_listing(listing, 0x057E, 0x0306);
    }
});
