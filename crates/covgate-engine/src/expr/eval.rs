use std::borrow::Cow;
use std::cmp::Ordering;

use covgate_core::context::Variables;
use regex::Regex;

use super::parser::{BinaryOp, Expr, Literal, UnaryOp};
use super::value::Value;

pub fn eval<'a>(expr: &'a Expr, vars: &'a Variables) -> Result<Value<'a>, String> {
    match expr {
        Expr::Literal(lit) => Ok(match lit {
            Literal::Nil => Value::Nil,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Str(s) => Value::Str(Cow::Borrowed(s)),
        }),
        Expr::List(items) => items
            .iter()
            .map(|e| eval(e, vars))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Ident(name) => vars
            .get(name)
            .map(Value::from_variable)
            .ok_or_else(|| format!("unknown name {name}")),
        Expr::Member(base, field) => {
            let base = eval(base, vars)?;
            Ok(base.field(field)?.unwrap_or(Value::Nil))
        }
        Expr::Index(base, index) => {
            let base = eval(base, vars)?;
            let index = eval(index, vars)?;
            eval_index(base, index)
        }
        Expr::Unary(op, operand) => {
            let v = eval(operand, vars)?;
            match (op, v) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, Value::Int(i)) => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| "integer overflow".to_string()),
                (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
                (UnaryOp::Not, v) => Err(format!("invalid operation: ! {}", v.type_name())),
                (UnaryOp::Neg, v) => Err(format!("invalid operation: - {}", v.type_name())),
            }
        }
        Expr::Binary(BinaryOp::And, l, r) => {
            if !expect_bool(BinaryOp::And, eval(l, vars)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(expect_bool(BinaryOp::And, eval(r, vars)?)?))
        }
        Expr::Binary(BinaryOp::Or, l, r) => {
            if expect_bool(BinaryOp::Or, eval(l, vars)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(expect_bool(BinaryOp::Or, eval(r, vars)?)?))
        }
        Expr::Binary(op, l, r) => {
            let left = eval(l, vars)?;
            let right = eval(r, vars)?;
            eval_binary(*op, left, right)
        }
    }
}

fn expect_bool(op: BinaryOp, v: Value<'_>) -> Result<bool, String> {
    match v {
        Value::Bool(b) => Ok(b),
        other => Err(format!(
            "invalid operation: {} requires bool operands, got {}",
            op.symbol(),
            other.type_name()
        )),
    }
}

fn eval_index<'a>(base: Value<'a>, index: Value<'a>) -> Result<Value<'a>, String> {
    match &index {
        Value::Str(key) => Ok(base.field(key)?.unwrap_or(Value::Nil)),
        Value::Int(i) => {
            let items = base
                .items()
                .ok_or_else(|| format!("cannot index {} with int", base.type_name()))?;
            let len = items.len() as i64;
            let at = if *i < 0 { len + i } else { *i };
            if at < 0 || at >= len {
                return Err(format!("index out of range: {i} (length {len})"));
            }
            Ok(items.into_iter().nth(at as usize).unwrap_or(Value::Nil))
        }
        other => Err(format!(
            "cannot index {} with {}",
            base.type_name(),
            other.type_name()
        )),
    }
}

fn eval_binary<'a>(op: BinaryOp, left: Value<'a>, right: Value<'a>) -> Result<Value<'a>, String> {
    let mismatch = |l: &Value<'_>, r: &Value<'_>| {
        format!(
            "invalid operation: {} {} {}",
            l.type_name(),
            op.symbol(),
            r.type_name()
        )
    };

    match op {
        BinaryOp::Eq => Ok(Value::Bool(left.equals(&right))),
        BinaryOp::Ne => Ok(Value::Bool(!left.equals(&right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ord = compare(&left, &right).ok_or_else(|| mismatch(&left, &right))?;
            let result = match op {
                BinaryOp::Lt => ord == Ordering::Less,
                BinaryOp::Le => ord != Ordering::Greater,
                BinaryOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::In | BinaryOp::NotIn => {
            let found = membership(&left, &right).ok_or_else(|| mismatch(&left, &right))?;
            Ok(Value::Bool(found == (op == BinaryOp::In)))
        }
        BinaryOp::Contains | BinaryOp::StartsWith | BinaryOp::EndsWith | BinaryOp::Matches => {
            let (Value::Str(l), Value::Str(r)) = (&left, &right) else {
                return Err(mismatch(&left, &right));
            };
            let result = match op {
                BinaryOp::Contains => l.contains(&**r),
                BinaryOp::StartsWith => l.starts_with(&**r),
                BinaryOp::EndsWith => l.ends_with(&**r),
                _ => Regex::new(r)
                    .map_err(|e| format!("invalid pattern {r:?}: {e}"))?
                    .is_match(l),
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => match (&left, &right) {
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(Cow::Owned(format!("{l}{r}")))),
            (Value::Int(l), Value::Int(r)) => l
                .checked_add(*r)
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            _ => float_op(&left, &right, |a, b| a + b).ok_or_else(|| mismatch(&left, &right)),
        },
        BinaryOp::Sub => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => l
                .checked_sub(*r)
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            _ => float_op(&left, &right, |a, b| a - b).ok_or_else(|| mismatch(&left, &right)),
        },
        BinaryOp::Mul => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => l
                .checked_mul(*r)
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            _ => float_op(&left, &right, |a, b| a * b).ok_or_else(|| mismatch(&left, &right)),
        },
        BinaryOp::Div => float_op(&left, &right, |a, b| a / b).ok_or_else(|| mismatch(&left, &right)),
        BinaryOp::Rem => match (&left, &right) {
            (Value::Int(_), Value::Int(0)) => Err("integer divide by zero".to_string()),
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_rem(*r))),
            _ => Err(mismatch(&left, &right)),
        },
        BinaryOp::And => Ok(Value::Bool(
            expect_bool(op, left)? && expect_bool(op, right)?,
        )),
        BinaryOp::Or => Ok(Value::Bool(
            expect_bool(op, left)? || expect_bool(op, right)?,
        )),
    }
}

fn float_op<'a>(l: &Value<'_>, r: &Value<'_>, f: impl Fn(f64, f64) -> f64) -> Option<Value<'a>> {
    Some(Value::Float(f(l.as_f64()?, r.as_f64()?)))
}

fn compare(l: &Value<'_>, r: &Value<'_>) -> Option<Ordering> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => l.as_f64()?.partial_cmp(&r.as_f64()?),
    }
}

fn membership(needle: &Value<'_>, haystack: &Value<'_>) -> Option<bool> {
    if let Some(items) = haystack.items() {
        return Some(items.iter().any(|item| needle.equals(item)));
    }
    match needle {
        Value::Str(key) => haystack.has_key(key),
        _ => None,
    }
}
