pub mod decision;
pub mod evaluator;

pub use decision::{ActionDecision, ActionVerdict};
pub use evaluator::{evaluate, GateEvaluator};
