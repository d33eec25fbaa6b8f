//! Gate expression language.
//!
//! Expressions are compiled once into a [`Program`] and evaluated against the
//! typed namespace of a [`covgate_core::context::RunContext`]:
//!
//! ```text
//! is_default_branch && github.event_name == "push"
//! weekday not in [0, 6] and hour >= 9
//! github.event.pull_request.head.ref startsWith "release/"
//! env.DEPLOY_ENV == "production" || is_pull_request == false
//! ```

pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

use covgate_core::context::Variables;
use covgate_core::errors::ExpressionError;

use self::parser::Expr;
pub use self::value::Value;

/// A parsed expression together with its source text.
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    root: Expr,
}

/// Parse an expression.
pub fn compile(source: &str) -> Result<Program, ExpressionError> {
    let tokens = lexer::tokenize(source).map_err(|e| ExpressionError::new(source, e))?;
    let root = parser::parse(&tokens).map_err(|e| ExpressionError::new(source, e))?;
    Ok(Program {
        source: source.to_string(),
        root,
    })
}

impl Program {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against a set of bindings.
    ///
    /// Every referenced name must be bound, including names inside branches that
    /// short-circuiting would skip.
    pub fn eval<'a>(&'a self, vars: &'a Variables) -> Result<Value<'a>, ExpressionError> {
        let mut names = Vec::new();
        self.root.idents(&mut names);
        if let Some(unknown) = names.into_iter().find(|n| vars.get(n).is_none()) {
            return Err(ExpressionError::new(
                &self.source,
                format!("unknown name {unknown}"),
            ));
        }
        eval::eval(&self.root, vars).map_err(|e| ExpressionError::new(&self.source, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use covgate_core::context::{Event, RunContext};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn ctx() -> RunContext {
        let mut env = BTreeMap::new();
        env.insert("DEPLOY_ENV".to_string(), "production".to_string());
        env.insert("EMPTY".to_string(), String::new());
        RunContext::new(
            // Wednesday
            Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap(),
            Event {
                name: "pull_request".into(),
                payload: json!({
                    "action": "opened",
                    "number": 42,
                    "pull_request": {
                        "draft": false,
                        "labels": [{"name": "bug"}, {"name": "ci"}],
                        "head": {"ref": "release/1.2"}
                    },
                    "commits": 3.5
                }),
            },
            env,
            false,
            true,
        )
    }

    fn run(src: &str) -> Result<String, ExpressionError> {
        let vars = ctx().variables();
        let program = compile(src)?;
        let v = program.eval(&vars)?;
        Ok(v.to_string())
    }

    #[test]
    fn calendar_and_flags() {
        assert_eq!(run("year == 2024 && month == 5").unwrap(), "true");
        assert_eq!(run("weekday not in [0, 6] and hour >= 9").unwrap(), "true");
        assert_eq!(run("is_pull_request && !is_default_branch").unwrap(), "true");
        assert_eq!(run("day % 2 == 1").unwrap(), "true");
    }

    #[test]
    fn event_payload_access() {
        assert_eq!(run("github.event_name").unwrap(), "\"pull_request\"");
        assert_eq!(run("github.event.number == 42").unwrap(), "true");
        assert_eq!(
            run("github.event.pull_request.head.ref startsWith 'release/'").unwrap(),
            "true"
        );
        assert_eq!(
            run("github.event.pull_request.labels[0].name == 'bug'").unwrap(),
            "true"
        );
        assert_eq!(
            run("github.event.pull_request.labels[-1][\"name\"]").unwrap(),
            "\"ci\""
        );
        assert_eq!(run("github.event.commits > 3").unwrap(), "true");
        assert_eq!(run("'draft' in github.event.pull_request").unwrap(), "true");
        assert_eq!(run("github.event.missing == nil").unwrap(), "true");
    }

    #[test]
    fn environment_access() {
        assert_eq!(run("env.DEPLOY_ENV == 'production'").unwrap(), "true");
        assert_eq!(run("env.EMPTY == ''").unwrap(), "true");
        assert_eq!(run("env.UNSET == nil").unwrap(), "true");
        assert_eq!(run("'DEPLOY_ENV' in env").unwrap(), "true");
        assert_eq!(run("env[\"DEPLOY_ENV\"] matches '^prod'").unwrap(), "true");
    }

    #[test]
    fn arithmetic() {
        assert_eq!(run("1 + 2 * 3").unwrap(), "7");
        assert_eq!(run("7 / 2").unwrap(), "3.5");
        assert_eq!(run("(1 + 2) * 3").unwrap(), "9");
        assert_eq!(run("'a' + 'b'").unwrap(), "\"ab\"");
        assert_eq!(run("-hour").unwrap(), "-14");
    }

    #[test]
    fn short_circuit_skips_type_errors() {
        assert_eq!(run("false && 1").unwrap(), "false");
        assert_eq!(run("true || 'x'").unwrap(), "true");
    }

    #[test]
    fn unknown_names_fail_even_when_unreachable() {
        let err = run("false && nope").unwrap_err();
        assert_eq!(err.reason, "unknown name nope");
        assert_eq!(err.expression, "false && nope");
    }

    #[test]
    fn type_errors() {
        assert!(run("year < 'x'").unwrap_err().reason.contains("int < string"));
        assert!(run("1 && true").unwrap_err().reason.contains("bool operands"));
        assert!(run("!1").unwrap_err().reason.contains("! int"));
        assert!(run("year.foo").unwrap_err().reason.contains("on int"));
        assert!(run("github.event.missing.deeper")
            .unwrap_err()
            .reason
            .contains("on nil"));
        assert!(run("1 % 0").unwrap_err().reason.contains("divide by zero"));
        assert!(run("'a' matches '('").unwrap_err().reason.contains("invalid pattern"));
        assert!(run("[1][5]").unwrap_err().reason.contains("out of range"));
    }

    #[test]
    fn syntax_error_carries_source() {
        let err = compile("year >").unwrap_err();
        assert_eq!(err.expression, "year >");
        assert!(err.to_string().contains("year >"));
    }
}
