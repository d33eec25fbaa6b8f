use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use covgate_core::context::Variable;

/// A value produced during evaluation, borrowing from the program and the
/// bound variables wherever possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
    List(Vec<Value<'a>>),
    Mapping(&'a BTreeMap<String, String>),
    /// A JSON array or object; scalars are unwrapped on access.
    Document(&'a serde_json::Value),
    Namespace(&'a BTreeMap<String, Variable>),
}

impl<'a> Value<'a> {
    pub fn from_json(v: &'a serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(Cow::Borrowed(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Value::Document(v),
        }
    }

    pub fn from_variable(v: &'a Variable) -> Self {
        match v {
            Variable::Int(i) => Value::Int(*i),
            Variable::String(s) => Value::Str(Cow::Borrowed(s)),
            Variable::Bool(b) => Value::Bool(*b),
            Variable::Mapping(m) => Value::Mapping(m),
            Variable::Document(d) => Value::from_json(d),
            Variable::Namespace(ns) => Value::Namespace(ns),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Mapping(_) => "mapping",
            Value::Document(serde_json::Value::Array(_)) => "array",
            Value::Document(_) => "object",
            Value::Namespace(_) => "namespace",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Elements of a list or JSON array.
    pub fn items(&self) -> Option<Vec<Value<'a>>> {
        match self {
            Value::List(items) => Some(items.clone()),
            &Value::Document(serde_json::Value::Array(arr)) => {
                Some(arr.iter().map(Value::from_json).collect())
            }
            _ => None,
        }
    }

    /// Lookup by key on keyed values. `Ok(None)` means the value is keyed but
    /// has no such entry.
    pub fn field(&self, key: &str) -> Result<Option<Value<'a>>, String> {
        match *self {
            Value::Mapping(m) => Ok(m.get(key).map(|s| Value::Str(Cow::Borrowed(s.as_str())))),
            Value::Document(serde_json::Value::Object(obj)) => {
                Ok(obj.get(key).map(Value::from_json))
            }
            Value::Namespace(ns) => Ok(ns.get(key).map(Value::from_variable)),
            _ => Err(format!(
                "cannot access field `{key}` on {}",
                self.type_name()
            )),
        }
    }

    pub fn has_key(&self, key: &str) -> Option<bool> {
        match *self {
            Value::Mapping(m) => Some(m.contains_key(key)),
            Value::Document(serde_json::Value::Object(obj)) => Some(obj.contains_key(key)),
            Value::Namespace(ns) => Some(ns.contains_key(key)),
            _ => None,
        }
    }

    /// Values of different kinds are never equal, except that ints and floats
    /// compare numerically.
    pub fn equals(&self, other: &Value<'_>) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Namespace(a), Value::Namespace(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (a, b) if a.as_f64().is_some() && b.as_f64().is_some() => a.as_f64() == b.as_f64(),
            (a, b) => match (a.items(), b.items()) {
                (Some(xs), Some(ys)) => {
                    xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| x.equals(y))
                }
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Mapping(m) => write!(f, "<mapping of {} entries>", m.len()),
            Value::Document(d) => write!(f, "{d}"),
            Value::Namespace(ns) => write!(f, "<namespace of {} entries>", ns.len()),
        }
    }
}
