#![no_main]
use covgate_core::types::MetricKind;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let value = f64::from_le_bytes(data[..8].try_into().unwrap());
    if let Ok(threshold) = std::str::from_utf8(&data[8..]) {
        for kind in [
            MetricKind::Coverage,
            MetricKind::CodeToTestRatio,
            MetricKind::TestExecutionTime,
        ] {
            let _ = covgate_engine::acceptable::check(kind, value, threshold);
            let _ = covgate_engine::tier::tier(kind, value);
        }
    }
});
