use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// The upstream CI event that triggered this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub payload: serde_json::Value,
}

/// Snapshot of run-time facts that gate expressions are evaluated against.
///
/// Built once per gating call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunContext {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    /// 0 = Sunday.
    pub weekday: u32,
    pub event: Event,
    #[serde(skip)]
    pub environment: BTreeMap<String, String>,
    pub is_default_branch: bool,
    pub is_pull_request: bool,
}

impl RunContext {
    pub fn new(
        now: DateTime<Utc>,
        event: Event,
        environment: BTreeMap<String, String>,
        is_default_branch: bool,
        is_pull_request: bool,
    ) -> Self {
        RunContext {
            year: now.year(),
            month: now.month(),
            day: now.day(),
            hour: now.hour(),
            weekday: now.weekday().num_days_from_sunday(),
            event,
            environment,
            is_default_branch,
            is_pull_request,
        }
    }

    /// The variable namespace exposed to gate expressions.
    pub fn variables(&self) -> Variables {
        let mut github = BTreeMap::new();
        github.insert(
            "event_name".to_string(),
            Variable::String(self.event.name.clone()),
        );
        github.insert(
            "event".to_string(),
            Variable::Document(self.event.payload.clone()),
        );

        let mut vars = BTreeMap::new();
        vars.insert("year", Variable::Int(i64::from(self.year)));
        vars.insert("month", Variable::Int(i64::from(self.month)));
        vars.insert("day", Variable::Int(i64::from(self.day)));
        vars.insert("hour", Variable::Int(i64::from(self.hour)));
        vars.insert("weekday", Variable::Int(i64::from(self.weekday)));
        vars.insert("github", Variable::Namespace(github));
        vars.insert("env", Variable::Mapping(self.environment.clone()));
        vars.insert("is_default_branch", Variable::Bool(self.is_default_branch));
        vars.insert("is_pull_request", Variable::Bool(self.is_pull_request));
        Variables(vars)
    }
}

/// A typed value bound to a name in the expression namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Int(i64),
    String(String),
    Bool(bool),
    /// Flat string-to-string table such as the process environment.
    Mapping(BTreeMap<String, String>),
    /// Semi-structured data queried by field and index, e.g. an event payload.
    Document(serde_json::Value),
    /// Named group of variables (`github.event_name`, `github.event`).
    Namespace(BTreeMap<String, Variable>),
}

impl Variable {
    pub fn kind(&self) -> &'static str {
        match self {
            Variable::Int(_) => "int",
            Variable::String(_) => "string",
            Variable::Bool(_) => "bool",
            Variable::Mapping(_) => "mapping",
            Variable::Document(_) => "document",
            Variable::Namespace(_) => "namespace",
        }
    }
}

/// Top-level bindings for one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(BTreeMap<&'static str, Variable>);

impl Variables {
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &&'static str> {
        self.0.keys()
    }
}
