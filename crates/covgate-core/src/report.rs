use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::MetricKind;

/// Measured values for one CI run. Absent metrics are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_to_test_ratio: Option<f64>,

    /// Elapsed test time in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_execution_time_ns: Option<f64>,
}

impl MetricsReport {
    pub fn value(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::Coverage => self.coverage_percent,
            MetricKind::CodeToTestRatio => self.code_to_test_ratio,
            MetricKind::TestExecutionTime => self.test_execution_time_ns,
        }
    }

    /// Load a report from a JSON file.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read report {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("{path}: invalid report JSON"))
    }
}
