#![no_main]
use covgate_core::duration::{parse_duration, HumanDuration};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(d) = parse_duration(s) {
            let rendered = HumanDuration(d).to_string();
            assert_eq!(parse_duration(&rendered).ok(), Some(d), "{rendered}");
        }
    }
});
