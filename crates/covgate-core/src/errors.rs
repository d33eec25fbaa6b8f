use std::fmt;

use crate::types::MetricKind;

/// Missing or invalid repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("repository: not set (or env GITHUB_REPOSITORY is not set)")]
    MissingRepository,
    #[error("repository: invalid identifier \"{0}\" (expected owner/repo)")]
    MalformedRepository(String),
}

/// Failure reported by a platform client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("env {0} is not set")]
    MissingEnv(&'static str),
    #[error("cannot decode event payload: {0}")]
    EventPayload(String),
    #[error("cannot look up default branch of {repo}: {reason}")]
    DefaultBranch { repo: String, reason: String },
    #[error("cannot detect current branch: {0}")]
    BranchUndetected(String),
    #[error("not running in a pull request context: {0}")]
    PullRequestUndetected(String),
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

/// A gate expression that could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid condition `{expression}`: {reason}")]
pub struct ExpressionError {
    pub expression: String,
    pub reason: String,
}

impl ExpressionError {
    pub fn new(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

/// Which threshold grammar rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdGrammar {
    Percentage,
    Ratio,
    Duration,
}

impl fmt::Display for ThresholdGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdGrammar::Percentage => write!(f, "percentage"),
            ThresholdGrammar::Ratio => write!(f, "ratio"),
            ThresholdGrammar::Duration => write!(f, "duration"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {grammar} threshold \"{input}\": {reason}")]
pub struct ThresholdParseError {
    pub grammar: ThresholdGrammar,
    pub input: String,
    pub reason: String,
}

/// A metric that does not meet its threshold, or a threshold that cannot be read.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcceptabilityError {
    #[error(transparent)]
    Threshold(#[from] ThresholdParseError),
    #[error("code coverage is {actual:.1}%, which is below the accepted {accepted:.1}%")]
    CoverageBelow { actual: f64, accepted: f64 },
    #[error("code to test ratio is 1:{actual:.1}, which is below the accepted 1:{accepted:.1}")]
    RatioBelow { actual: f64, accepted: f64 },
    #[error("test execution time is {actual}, which is above the accepted {accepted}")]
    ExecutionTimeAbove { actual: String, accepted: String },
    #[error("measured {metric} value {value} is not a finite number")]
    NonFinite { metric: MetricKind, value: f64 },
}

/// Any failure of a gating call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}
