//! Badge color tiers.
//!
//! | metric     | green | yellowgreen | yellow | orange | red  |
//! |------------|-------|-------------|--------|--------|------|
//! | coverage % | ≥80   | ≥60         | ≥40    | ≥20    | else |
//! | ratio      | ≥1.2  | ≥1.0        | ≥0.8   | ≥0.6   | else |
//! | duration   | <5m   | <10m        | <15m   | <20m   | else |

use std::time::Duration;

use covgate_core::types::{MetricKind, SeverityTier};

const COVERAGE_BREAKPOINTS: [f64; 4] = [80.0, 60.0, 40.0, 20.0];
const RATIO_BREAKPOINTS: [f64; 4] = [1.2, 1.0, 0.8, 0.6];
const DURATION_BREAKPOINTS_MIN: [u64; 4] = [5, 10, 15, 20];

// NaN fails every comparison and lands in red.
fn at_least(value: f64, breakpoints: &[f64; 4]) -> SeverityTier {
    breakpoints
        .iter()
        .position(|&b| value >= b)
        .map_or(SeverityTier::Red, |i| SeverityTier::ALL[i])
}

pub fn coverage_tier(percent: f64) -> SeverityTier {
    at_least(percent, &COVERAGE_BREAKPOINTS)
}

pub fn code_to_test_ratio_tier(ratio: f64) -> SeverityTier {
    at_least(ratio, &RATIO_BREAKPOINTS)
}

pub fn test_execution_time_tier(elapsed: Duration) -> SeverityTier {
    DURATION_BREAKPOINTS_MIN
        .iter()
        .position(|&m| elapsed < Duration::from_secs(m * 60))
        .map_or(SeverityTier::Red, |i| SeverityTier::ALL[i])
}

/// Tier for a nanosecond count. Negative counts are treated as zero; NaN and
/// counts past the `u64` range map to red.
pub fn test_execution_time_tier_nanos(nanos: f64) -> SeverityTier {
    if nanos.is_nan() {
        return SeverityTier::Red;
    }
    if nanos >= u64::MAX as f64 {
        return SeverityTier::Red;
    }
    test_execution_time_tier(Duration::from_nanos(nanos.max(0.0) as u64))
}

pub fn tier(kind: MetricKind, value: f64) -> SeverityTier {
    match kind {
        MetricKind::Coverage => coverage_tier(value),
        MetricKind::CodeToTestRatio => code_to_test_ratio_tier(value),
        MetricKind::TestExecutionTime => test_execution_time_tier_nanos(value),
    }
}
