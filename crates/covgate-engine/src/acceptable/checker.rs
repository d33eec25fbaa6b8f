use covgate_core::config::Config;
use covgate_core::duration::HumanDuration;
use covgate_core::errors::AcceptabilityError;
use covgate_core::report::MetricsReport;
use covgate_core::types::MetricKind;
use tracing::debug;

use super::threshold::{parse_duration_threshold, parse_percentage, parse_ratio};

/// Coverage percentage must be at least the threshold.
pub fn check_coverage(value: f64, threshold: &str) -> Result<(), AcceptabilityError> {
    if threshold.trim().is_empty() {
        return Ok(());
    }
    finite(MetricKind::Coverage, value)?;
    let accepted = parse_percentage(threshold)?;
    if value >= accepted {
        return Ok(());
    }
    Err(AcceptabilityError::CoverageBelow {
        actual: value,
        accepted,
    })
}

/// Code-to-test ratio (`1:<value>`) must be at least the threshold.
pub fn check_code_to_test_ratio(value: f64, threshold: &str) -> Result<(), AcceptabilityError> {
    if threshold.trim().is_empty() {
        return Ok(());
    }
    finite(MetricKind::CodeToTestRatio, value)?;
    let accepted = parse_ratio(threshold)?;
    if value >= accepted {
        return Ok(());
    }
    Err(AcceptabilityError::RatioBelow {
        actual: value,
        accepted,
    })
}

/// Elapsed test time in nanoseconds must not exceed the threshold.
pub fn check_test_execution_time(nanos: f64, threshold: &str) -> Result<(), AcceptabilityError> {
    if threshold.trim().is_empty() {
        return Ok(());
    }
    finite(MetricKind::TestExecutionTime, nanos)?;
    let accepted = parse_duration_threshold(threshold)?;
    if nanos <= accepted.as_nanos() as f64 {
        return Ok(());
    }
    Err(AcceptabilityError::ExecutionTimeAbove {
        actual: HumanDuration::from_nanos_f64(nanos).to_string(),
        accepted: HumanDuration(accepted).to_string(),
    })
}

fn finite(metric: MetricKind, value: f64) -> Result<(), AcceptabilityError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AcceptabilityError::NonFinite { metric, value })
    }
}

pub fn check(kind: MetricKind, value: f64, threshold: &str) -> Result<(), AcceptabilityError> {
    match kind {
        MetricKind::Coverage => check_coverage(value, threshold),
        MetricKind::CodeToTestRatio => check_code_to_test_ratio(value, threshold),
        MetricKind::TestExecutionTime => check_test_execution_time(value, threshold),
    }
}

/// Check every metric that is both configured and measured, in the order
/// coverage, ratio, execution time. The first failure is returned.
pub fn check_report(config: &Config, report: &MetricsReport) -> Result<(), AcceptabilityError> {
    for kind in [
        MetricKind::Coverage,
        MetricKind::CodeToTestRatio,
        MetricKind::TestExecutionTime,
    ] {
        let (Some(threshold), Some(value)) = (config.threshold(kind), report.value(kind)) else {
            debug!(metric = %kind, "not configured or not measured; skipping");
            continue;
        };
        check(kind, value, threshold)?;
        debug!(metric = %kind, value, threshold, "acceptable");
    }
    Ok(())
}
