#![no_main]
use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use covgate_core::context::{Event, RunContext};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(expression) = std::str::from_utf8(data) {
        let mut env = BTreeMap::new();
        env.insert("CI".to_string(), "true".to_string());
        let ctx = RunContext::new(
            Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap(),
            Event {
                name: "push".into(),
                payload: serde_json::json!({"ref": "refs/heads/main", "commits": [{"id": "a"}]}),
            },
            env,
            true,
            false,
        );
        let _ = covgate_engine::gates::evaluate(expression, &ctx);
    }
});
