use std::{cmp::Ordering, path::Path};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::{
    ast::ast::{Ast, BinaryOperator, NodeId, NodeKind, UnaryOperator},
    errors::errors::Error,
};

use super::{
    builtins::{call_function, call_method},
    interpreter::Interpreter,
    value::Value,
};

lazy_static! {
    static ref FORMAT_VARIABLE: Regex = Regex::new(r"@([a-zA-Z_][a-zA-Z0-9_]*)@").unwrap();
}

pub fn eval_expression(
    interpreter: &mut Interpreter,
    ast: &Ast,
    expression: NodeId,
) -> Result<Value, Error> {
    let value = match ast.kind(expression) {
        NodeKind::BooleanLiteral { value } => Value::Bool(*value),
        NodeKind::IntegerLiteral { value } => Value::Int(*value),
        NodeKind::StringLiteral { value, is_format } => {
            if *is_format {
                format_variables(interpreter, value)
            } else {
                Value::str(value.as_str())
            }
        }
        NodeKind::ArrayLiteral { args } => {
            let mut items = Vec::with_capacity(args.len());
            for arg in args {
                items.push(eval_expression(interpreter, ast, *arg)?);
            }
            Value::list(items)
        }
        NodeKind::DictionaryLiteral { values } => {
            let mut entries = IndexMap::new();
            for item in values {
                let NodeKind::KeyValueItem { key, value } = ast.kind(*item) else {
                    continue;
                };
                let key = eval_expression(interpreter, ast, *key)?;
                let value = eval_expression(interpreter, ast, *value)?;
                match key {
                    Value::Str(key) => {
                        entries.insert(key, value);
                    }
                    Value::Error(message) => return Ok(Value::Error(message)),
                    other => {
                        return Ok(Value::error(format!(
                            "Dictionary keys must be strings, not `{}`",
                            other.type_name()
                        )))
                    }
                }
            }
            Value::dict(entries)
        }
        NodeKind::IdExpression { id } => interpreter
            .scope
            .get(id)
            .cloned()
            .unwrap_or_else(|| Value::error(format!("Unknown identifier `{}`", id))),
        NodeKind::BinaryExpression { lhs, op, rhs } => {
            let lhs_value = eval_expression(interpreter, ast, *lhs)?;
            match (op, &lhs_value) {
                (BinaryOperator::And, Value::Bool(false)) => Value::Bool(false),
                (BinaryOperator::Or, Value::Bool(true)) => Value::Bool(true),
                _ => {
                    let rhs_value = eval_expression(interpreter, ast, *rhs)?;
                    binary_operation(*op, lhs_value, rhs_value)
                }
            }
        }
        NodeKind::UnaryExpression { op, expression } => {
            let value = eval_expression(interpreter, ast, *expression)?;
            match (op, value) {
                (_, Value::Error(message)) => Value::Error(message),
                (UnaryOperator::Not | UnaryOperator::ExclamationMark, Value::Bool(value)) => {
                    Value::Bool(!value)
                }
                (UnaryOperator::Minus, Value::Int(value)) => value
                    .checked_neg()
                    .map(Value::Int)
                    .unwrap_or_else(|| Value::error("Integer overflow")),
                (_, other) => {
                    Value::error(format!("Unable to apply unary operator to `{}`", other.type_name()))
                }
            }
        }
        NodeKind::ConditionalExpression {
            condition,
            if_true,
            if_false,
        } => match eval_expression(interpreter, ast, *condition)? {
            Value::Bool(true) => eval_expression(interpreter, ast, *if_true)?,
            Value::Bool(false) => eval_expression(interpreter, ast, *if_false)?,
            Value::Error(message) => Value::Error(message),
            other => Value::error(format!("Condition is `{}`, not bool", other.type_name())),
        },
        NodeKind::SubscriptExpression { outer, inner } => {
            let outer = eval_expression(interpreter, ast, *outer)?;
            let inner = eval_expression(interpreter, ast, *inner)?;
            subscript(outer, inner)
        }
        NodeKind::FunctionExpression { .. } => call_function(interpreter, ast, expression)?,
        NodeKind::MethodExpression { .. } => call_method(interpreter, ast, expression)?,
        NodeKind::ErrorNode { message } => Value::error(message.as_str()),
        _ => Value::Void,
    };
    Ok(value)
}

/// Applies a binary operator to two evaluated operands.
///
/// Compound assignments go through here too, so `x += y` and `x = x + y`
/// always agree.
pub fn binary_operation(op: BinaryOperator, lhs: Value, rhs: Value) -> Value {
    use BinaryOperator::*;

    match (op, &lhs, &rhs) {
        (_, Value::Error(_), _) => lhs.clone(),
        (_, _, Value::Error(_)) => rhs.clone(),

        (Equals, _, _) => Value::Bool(lhs == rhs),
        (NotEquals, _, _) => Value::Bool(lhs != rhs),

        (Plus, Value::Int(a), Value::Int(b)) => checked(a.checked_add(*b)),
        (Minus, Value::Int(a), Value::Int(b)) => checked(a.checked_sub(*b)),
        (Mul, Value::Int(a), Value::Int(b)) => checked(a.checked_mul(*b)),
        (Div, Value::Int(_), Value::Int(0)) => Value::error("Division by zero"),
        (Div, Value::Int(a), Value::Int(b)) => checked(a.checked_div(*b)),
        (Modulo, Value::Int(_), Value::Int(0)) => Value::error("Modulo by zero"),
        (Modulo, Value::Int(a), Value::Int(b)) => checked(a.checked_rem(*b)),

        (Plus, Value::Str(a), Value::Str(b)) => Value::Str(format!("{}{}", a, b)),
        (Div, Value::Str(a), Value::Str(b)) => Value::Str(join_path(a, b)),

        (Plus, Value::List(a), Value::List(b)) => {
            let mut items = a.as_ref().clone();
            items.extend(b.iter().cloned());
            Value::list(items)
        }
        (Plus, Value::List(a), _) => {
            let mut items = a.as_ref().clone();
            items.push(rhs.clone());
            Value::list(items)
        }
        (Plus, Value::Dict(a), Value::Dict(b)) => {
            let mut entries = a.as_ref().clone();
            for (key, value) in b.iter() {
                entries.insert(key.clone(), value.clone());
            }
            Value::dict(entries)
        }

        (Greater | Less | GreaterEquals | LessEquals, Value::Int(a), Value::Int(b)) => {
            Value::Bool(compare(op, a.cmp(b)))
        }
        (Greater | Less | GreaterEquals | LessEquals, Value::Str(a), Value::Str(b)) => {
            Value::Bool(compare(op, a.cmp(b)))
        }

        (In | NotIn, _, Value::List(items)) => Value::Bool(items.contains(&lhs) == (op == In)),
        (In | NotIn, Value::Str(key), Value::Dict(entries)) => {
            Value::Bool(entries.contains_key(key) == (op == In))
        }
        (In | NotIn, Value::Str(needle), Value::Str(haystack)) => {
            Value::Bool(haystack.contains(needle.as_str()) == (op == In))
        }

        (And, Value::Bool(a), Value::Bool(b)) => Value::Bool(*a && *b),
        (Or, Value::Bool(a), Value::Bool(b)) => Value::Bool(*a || *b),

        _ => Value::error(format!(
            "Unable to apply operator `{}` to types `{}` and `{}`",
            op,
            lhs.type_name(),
            rhs.type_name()
        )),
    }
}

fn checked(result: Option<i64>) -> Value {
    result
        .map(Value::Int)
        .unwrap_or_else(|| Value::error("Integer overflow"))
}

fn compare(op: BinaryOperator, ordering: Ordering) -> bool {
    match op {
        BinaryOperator::Greater => ordering == Ordering::Greater,
        BinaryOperator::Less => ordering == Ordering::Less,
        BinaryOperator::GreaterEquals => ordering != Ordering::Less,
        _ => ordering != Ordering::Greater,
    }
}

/// `a / b` on strings. An absolute `b` replaces `a`.
pub fn join_path(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    Path::new(a).join(b).to_string_lossy().into_owned()
}

/// Position of `idx` in a sequence of `len` items. Negative indices count
/// from the end.
pub fn list_index(len: usize, idx: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let idx = if idx < 0 { len + idx } else { idx };
    (0..len).contains(&idx).then_some(idx as usize)
}

fn subscript(outer: Value, inner: Value) -> Value {
    match (&outer, &inner) {
        (Value::Error(_), _) => outer.clone(),
        (_, Value::Error(_)) => inner.clone(),
        (Value::List(items), Value::Int(idx)) => list_index(items.len(), *idx)
            .map(|idx| items[idx].clone())
            .unwrap_or_else(|| Value::error(format!("Index {} out of range", idx))),
        (Value::Range(range), Value::Int(idx)) => list_index(range.len(), *idx)
            .and_then(|idx| range.get(idx))
            .map(Value::Int)
            .unwrap_or_else(|| Value::error(format!("Index {} out of range", idx))),
        (Value::Dict(entries), Value::Str(key)) => entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::error(format!("Key `{}` not found", key))),
        (Value::Str(value), Value::Int(idx)) => {
            let chars = value.chars().collect::<Vec<_>>();
            list_index(chars.len(), *idx)
                .map(|idx| Value::Str(chars[idx].to_string()))
                .unwrap_or_else(|| Value::error(format!("Index {} out of range", idx)))
        }
        _ => Value::error(format!(
            "Unable to subscript `{}` with `{}`",
            outer.type_name(),
            inner.type_name()
        )),
    }
}

/// Expands `@name@` references in an f-string from the current scope.
fn format_variables(interpreter: &Interpreter, template: &str) -> Value {
    let mut missing = None;
    let formatted = FORMAT_VARIABLE.replace_all(template, |captures: &Captures| {
        match interpreter.scope.get(&captures[1]) {
            Some(value) => value.to_display_string(),
            None => {
                missing.get_or_insert_with(|| captures[1].to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Value::error(format!("Unknown identifier `{}` in format string", name)),
        None => Value::str(formatted),
    }
}
