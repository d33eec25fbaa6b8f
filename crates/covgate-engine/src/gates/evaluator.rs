use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use covgate_core::config::Config;
use covgate_core::context::RunContext;
use covgate_core::errors::{ExpressionError, GateError};
use covgate_core::traits::{EnvironmentSource, PlatformClient};
use covgate_core::types::GatedAction;

use super::decision::{ActionDecision, ActionVerdict};
use crate::context::assembler::ContextAssembler;
use crate::expr::{compile, Program, Value};

/// Evaluate a gate expression against an assembled context.
///
/// An empty expression is `true`. Anything other than a boolean result is an
/// error: `1` or `"yes"` never count as `true`.
pub fn evaluate(expression: &str, ctx: &RunContext) -> Result<bool, ExpressionError> {
    if expression.trim().is_empty() {
        return Ok(true);
    }
    let program = compile(expression)?;
    run(&program, ctx)
}

fn run(program: &Program, ctx: &RunContext) -> Result<bool, ExpressionError> {
    let vars = ctx.variables();
    let value = program.eval(&vars)?;
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(ExpressionError::new(
            program.source(),
            format!("condition must evaluate to bool, got {}", other.type_name()),
        )),
    }
}

/// Gate evaluator bound to one platform client and repository.
///
/// Each call assembles a fresh context; nothing is cached between calls.
pub struct GateEvaluator<P, E> {
    assembler: ContextAssembler<P, E>,
}

impl<P: PlatformClient, E: EnvironmentSource> GateEvaluator<P, E> {
    pub fn new(assembler: ContextAssembler<P, E>) -> Self {
        Self { assembler }
    }

    pub fn assembler(&self) -> &ContextAssembler<P, E> {
        &self.assembler
    }

    pub fn check_if(&self, expression: &str) -> Result<bool, GateError> {
        self.check_if_at(expression, Utc::now())
    }

    /// Evaluate `expression`. The platform is only consulted when the
    /// expression is non-empty and parses.
    pub fn check_if_at(&self, expression: &str, now: DateTime<Utc>) -> Result<bool, GateError> {
        if expression.trim().is_empty() {
            debug!("empty condition; gate open");
            return Ok(true);
        }
        let program = compile(expression)?;
        let ctx = self.assembler.assemble_at(now)?;
        let result = run(&program, &ctx)?;
        debug!(condition = expression, result, "condition evaluated");
        Ok(result)
    }

    pub fn decide(&self, config: &Config) -> Result<Vec<ActionDecision>, GateError> {
        self.decide_at(config, Utc::now())
    }

    /// Decide every gated action in `config`.
    ///
    /// A false or ill-formed condition skips the action. Failures to assemble
    /// the context (missing repository, unreadable event) are returned.
    pub fn decide_at(
        &self,
        config: &Config,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActionDecision>, GateError> {
        let mut decisions = Vec::with_capacity(GatedAction::ALL.len());
        for action in GatedAction::ALL {
            let Some(condition) = config.condition(action) else {
                decisions.push(ActionDecision {
                    action,
                    condition: None,
                    verdict: ActionVerdict::Disabled,
                });
                continue;
            };

            let verdict = match self.check_if_at(condition, now) {
                Ok(true) => ActionVerdict::Run,
                Ok(false) => {
                    let reason =
                        format!("the condition in the `if` section is not met ({condition})");
                    info!("Skip {}: {}", action.describe(), reason);
                    ActionVerdict::Skip { reason }
                }
                Err(GateError::Expression(e)) => {
                    warn!("Skip {}: {}", action.describe(), e);
                    ActionVerdict::Skip {
                        reason: e.to_string(),
                    }
                }
                Err(e) => return Err(e),
            };

            decisions.push(ActionDecision {
                action,
                condition: Some(condition.to_string()),
                verdict,
            });
        }
        Ok(decisions)
    }
}
