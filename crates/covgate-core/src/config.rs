use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::{GatedAction, MetricKind};

/// Top-level `.covgate.yml` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<MetricConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_to_test_ratio: Option<MetricConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_execution_time: Option<MetricConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<ActionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<ActionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<ActionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central: Option<CentralConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Threshold expression; empty means no constraint.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub acceptable: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,

    /// Gate expression; empty means always.
    #[serde(rename = "if", default, skip_serializing_if = "String::is_empty")]
    pub condition: String,
}

impl ActionConfig {
    pub fn enabled(&self) -> bool {
        self.enable.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CentralConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<ActionConfig>,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("invalid covgate config")
    }

    /// Load a config file.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
        Self::from_yaml_str(&content).with_context(|| format!("{path}: invalid config"))
    }

    /// Threshold expression configured for a metric, if the metric section exists.
    pub fn threshold(&self, kind: MetricKind) -> Option<&str> {
        let section = match kind {
            MetricKind::Coverage => self.coverage.as_ref(),
            MetricKind::CodeToTestRatio => self.code_to_test_ratio.as_ref(),
            MetricKind::TestExecutionTime => self.test_execution_time.as_ref(),
        };
        section.map(|m| m.acceptable.as_str())
    }

    /// The `if` expression of an action, or `None` when the action is not enabled.
    pub fn condition(&self, action: GatedAction) -> Option<&str> {
        let section = match action {
            GatedAction::PushBadges => self.push.as_ref(),
            GatedAction::Comment => self.comment.as_ref(),
            GatedAction::Diff => self.diff.as_ref(),
            GatedAction::CentralPush => self
                .central
                .as_ref()
                .filter(|c| c.enable.unwrap_or(true))
                .and_then(|c| c.push.as_ref()),
        };
        section
            .filter(|a| a.enabled())
            .map(|a| a.condition.as_str())
    }
}
