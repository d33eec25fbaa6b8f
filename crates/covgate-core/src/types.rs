use serde::{Deserialize, Serialize};
use std::fmt;

/// Badge color tier, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Green,
    Yellowgreen,
    Yellow,
    Orange,
    Red,
}

impl SeverityTier {
    pub const ALL: [SeverityTier; 5] = [
        SeverityTier::Green,
        SeverityTier::Yellowgreen,
        SeverityTier::Yellow,
        SeverityTier::Orange,
        SeverityTier::Red,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Green => "green",
            SeverityTier::Yellowgreen => "yellowgreen",
            SeverityTier::Yellow => "yellow",
            SeverityTier::Orange => "orange",
            SeverityTier::Red => "red",
        }
    }

    /// shields.io badge-maker palette.
    pub fn hex(self) -> &'static str {
        match self {
            SeverityTier::Green => "#97CA00",
            SeverityTier::Yellowgreen => "#A4A61D",
            SeverityTier::Yellow => "#DFB317",
            SeverityTier::Orange => "#FE7D37",
            SeverityTier::Red => "#E05D44",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three metrics covgate knows how to judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Coverage,
    CodeToTestRatio,
    TestExecutionTime,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Coverage => write!(f, "coverage"),
            MetricKind::CodeToTestRatio => write!(f, "code_to_test_ratio"),
            MetricKind::TestExecutionTime => write!(f, "test_execution_time"),
        }
    }
}

/// Actions whose execution can be made conditional with an `if` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatedAction {
    PushBadges,
    Comment,
    Diff,
    CentralPush,
}

impl GatedAction {
    pub const ALL: [GatedAction; 4] = [
        GatedAction::PushBadges,
        GatedAction::Comment,
        GatedAction::Diff,
        GatedAction::CentralPush,
    ];

    /// Verb phrase used in skip diagnostics ("Skip pushing badges: ...").
    pub fn describe(self) -> &'static str {
        match self {
            GatedAction::PushBadges => "pushing badges",
            GatedAction::Comment => "commenting",
            GatedAction::Diff => "comparing reports",
            GatedAction::CentralPush => "pushing to central repository",
        }
    }
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatedAction::PushBadges => write!(f, "push"),
            GatedAction::Comment => write!(f, "comment"),
            GatedAction::Diff => write!(f, "diff"),
            GatedAction::CentralPush => write!(f, "central.push"),
        }
    }
}
