use covgate_core::types::GatedAction;
use serde::{Deserialize, Serialize};

/// Outcome of an action gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ActionVerdict {
    /// The action is not configured or has `enable: false`.
    Disabled,
    Run,
    Skip { reason: String },
}

/// Record of one action gate decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecision {
    pub action: GatedAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(flatten)]
    pub verdict: ActionVerdict,
}

impl ActionDecision {
    pub fn runs(&self) -> bool {
        self.verdict == ActionVerdict::Run
    }
}
