//! Built-in functions and methods with concrete semantics.
//!
//! Only calls whose result can be folded to a value are implemented here:
//! assertions, logging, `run_command`, option and variable introspection and
//! the methods of the primitive types. Any other known function evaluates to
//! an opaque handle of its declared return type.

use std::{cmp::Ordering, rc::Rc};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    errors::errors::{Error, ErrorImpl},
    types::types::{Type, TypeSet},
    Location,
};

use super::{
    expr::{eval_expression, join_path, list_index},
    interpreter::Interpreter,
    value::{option_value, RangeValue, Value},
};

lazy_static! {
    static ref FORMAT_INDEX: Regex = Regex::new(r"@(\d+)@").unwrap();
}

/// Evaluated arguments of one call.
#[derive(Debug, Default)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub keywords: IndexMap<String, Value>,
}

impl Arguments {
    pub fn evaluate(
        interpreter: &mut Interpreter,
        ast: &Ast,
        args: Option<NodeId>,
    ) -> Result<Arguments, Error> {
        let (positional_ids, keyword_ids) = ast.call_arguments(args);
        let mut arguments = Arguments::default();
        for id in positional_ids {
            arguments
                .positional
                .push(eval_expression(interpreter, ast, id)?);
        }
        for (name, id) in keyword_ids {
            let value = eval_expression(interpreter, ast, id)?;
            arguments.keywords.insert(name, value);
        }
        Ok(arguments)
    }

    /// The first error value among the arguments.
    fn first_error(&self) -> Option<Value> {
        self.positional
            .iter()
            .chain(self.keywords.values())
            .find(|value| value.is_error())
            .cloned()
    }

    fn has_disabler(&self) -> bool {
        self.positional
            .iter()
            .chain(self.keywords.values())
            .any(|value| matches!(value, Value::Disabler))
    }

    fn str(&self, idx: usize) -> Option<&str> {
        match self.positional.get(idx) {
            Some(Value::Str(value)) => Some(value),
            _ => None,
        }
    }

    fn int(&self, idx: usize) -> Option<i64> {
        match self.positional.get(idx) {
            Some(Value::Int(value)) => Some(*value),
            _ => None,
        }
    }

    fn bool_keyword(&self, name: &str, default: bool) -> bool {
        match self.keywords.get(name) {
            Some(Value::Bool(value)) => *value,
            _ => default,
        }
    }

    fn joined(&self) -> String {
        self.positional
            .iter()
            .map(Value::to_display_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn call_function(
    interpreter: &mut Interpreter,
    ast: &Ast,
    call: NodeId,
) -> Result<Value, Error> {
    let name = ast.function_name(call).unwrap_or_default();
    let location = ast.location(call);
    let args = Arguments::evaluate(interpreter, ast, ast.call_args(call))?;

    if let Some(error) = args.first_error() {
        return Ok(error);
    }
    if args.has_disabler() && !matches!(name, "is_disabler" | "set_variable") {
        return Ok(Value::Disabler);
    }

    let value = match name {
        "assert" => match args.positional.first() {
            Some(Value::Bool(true)) => Value::Void,
            Some(Value::Bool(false)) => {
                let message = args.str(1).unwrap_or("assertion failed").to_string();
                return Err(Error::new(ErrorImpl::AssertionFailed { message }, location));
            }
            _ => Value::error("assert() expects a bool as its first argument"),
        },
        "error" => {
            let message = args.joined();
            return Err(Error::new(ErrorImpl::UserError { message }, location));
        }
        "message" => {
            info!("{}", args.joined());
            Value::Void
        }
        "warning" => {
            warn!("{}", args.joined());
            Value::Void
        }
        "debug" => {
            debug!("{}", args.joined());
            Value::Void
        }
        "run_command" => run_command(interpreter, &args, location)?,
        "get_option" => match args.str(0) {
            Some(option) => interpreter
                .options
                .get(option)
                .map(option_value)
                .unwrap_or_else(|| Value::error(format!("Unknown option `{}`", option))),
            None => Value::error("get_option() expects a string"),
        },
        "join_paths" => {
            let mut path = String::new();
            for part in &args.positional {
                let Value::Str(part) = part else {
                    return Ok(Value::error("join_paths() expects strings"));
                };
                path = join_path(&path, part);
            }
            Value::Str(path)
        }
        "range" => range(&args),
        "is_variable" => match args.str(0) {
            Some(variable) => Value::Bool(interpreter.scope.contains_key(variable)),
            None => Value::error("is_variable() expects a string"),
        },
        "get_variable" => match args.str(0) {
            Some(variable) => interpreter
                .scope
                .get(variable)
                .cloned()
                .or_else(|| args.positional.get(1).cloned())
                .unwrap_or_else(|| Value::error(format!("Unknown variable `{}`", variable))),
            None => Value::error("get_variable() expects a string"),
        },
        "set_variable" => match (args.str(0), args.positional.get(1)) {
            (Some(variable), Some(value)) => {
                interpreter.scope.insert(variable.to_string(), value.clone());
                Value::Void
            }
            _ => Value::error("set_variable() expects a name and a value"),
        },
        "unset_variable" => match args.str(0) {
            Some(variable) => {
                interpreter.scope.remove(variable);
                Value::Void
            }
            None => Value::error("unset_variable() expects a string"),
        },
        "files" => {
            let mut files = vec![];
            for value in &args.positional {
                flatten_strings(value, &mut files);
            }
            Value::list(files.into_iter().map(Value::Str).collect())
        }
        "disabler" => Value::Disabler,
        "is_disabler" => Value::Bool(matches!(args.positional.first(), Some(Value::Disabler))),
        other => match interpreter.ns.lookup_function(other) {
            Some(function) => opaque(&function.return_types),
            None => Value::error(format!("Unknown function `{}`", other)),
        },
    };
    Ok(value)
}

fn range(args: &Arguments) -> Value {
    let (start, stop) = match (args.int(0), args.int(1)) {
        (Some(stop), None) => (0, stop),
        (Some(start), Some(stop)) => (start, stop),
        _ => return Value::error("range() expects integers"),
    };
    let step = match args.positional.get(2) {
        None => 1,
        Some(Value::Int(step)) if *step > 0 => *step,
        Some(_) => return Value::error("range() step must be a positive integer"),
    };

    Value::Range(RangeValue { start, stop, step })
}

fn flatten_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Str(value) => out.push(value.clone()),
        Value::List(items) => items.iter().for_each(|item| flatten_strings(item, out)),
        _ => {}
    }
}

/// Handle for a call the interpreter cannot fold.
fn opaque(return_types: &TypeSet) -> Value {
    return_types
        .iter()
        .find_map(|ty| match ty {
            Type::Object(name) | Type::Lazy(name) => Some(Value::Object(name.clone())),
            _ => None,
        })
        .unwrap_or(Value::Void)
}

fn run_command(
    interpreter: &mut Interpreter,
    args: &Arguments,
    location: Location,
) -> Result<Value, Error> {
    let mut argv = vec![];
    for value in &args.positional {
        match value {
            Value::Str(_) | Value::List(_) => flatten_strings(value, &mut argv),
            other => {
                return Ok(Value::error(format!(
                    "run_command() cannot run a `{}`",
                    other.type_name()
                )))
            }
        }
    }

    let env = match args.keywords.get("env") {
        None => vec![],
        Some(Value::Dict(entries)) => entries
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Str(value) => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect(),
        Some(Value::List(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Str(pair) => pair
                    .split_once('=')
                    .map(|(key, value)| (key.to_string(), value.to_string())),
                _ => None,
            })
            .collect(),
        Some(other) => {
            return Ok(Value::error(format!(
                "run_command() env must be a dict, not `{}`",
                other.type_name()
            )))
        }
    };
    let capture = args.bool_keyword("capture", true);
    let check = args.bool_keyword("check", true);

    let result = match interpreter.runner.run(
        &argv,
        &interpreter.source_dir,
        &env,
        capture,
        &interpreter.cancel,
    ) {
        Ok(result) => result,
        Err(error) if error.is_fatal() => {
            return Err(Error::new(error.get_internal().clone(), location))
        }
        Err(error) => {
            let message = error.to_string();
            interpreter.call_failures.push((location, error));
            return Ok(Value::Error(message));
        }
    };

    if check && result.returncode != 0 {
        return Err(Error::new(
            ErrorImpl::CommandFailed {
                command: argv.join(" "),
                returncode: result.returncode,
                stderr: result.stderr.trim_end().to_string(),
            },
            location,
        ));
    }
    Ok(Value::RunResult(Rc::new(result)))
}

pub fn call_method(
    interpreter: &mut Interpreter,
    ast: &Ast,
    call: NodeId,
) -> Result<Value, Error> {
    let NodeKind::MethodExpression { obj, id, args } = ast.kind(call) else {
        return Ok(Value::Void);
    };
    let receiver = eval_expression(interpreter, ast, *obj)?;
    let name = ast.id_name(*id).unwrap_or_default();
    let args = Arguments::evaluate(interpreter, ast, *args)?;

    if receiver.is_error() {
        return Ok(receiver);
    }
    if let Some(error) = args.first_error() {
        return Ok(error);
    }

    let value = match &receiver {
        Value::Str(value) => str_method(value, name, &args),
        Value::Int(value) => int_method(*value, name),
        Value::Bool(value) => bool_method(*value, name, &args),
        Value::List(items) => list_method(items, name, &args),
        Value::Dict(entries) => dict_method(entries, name, &args),
        Value::RunResult(result) => match name {
            "returncode" => Some(Value::Int(result.returncode)),
            "stdout" => Some(Value::Str(result.stdout.clone())),
            "stderr" => Some(Value::Str(result.stderr.clone())),
            _ => None,
        },
        Value::Disabler => match name {
            "found" => Some(Value::Bool(false)),
            _ => Some(Value::Disabler),
        },
        Value::Object(type_name) => interpreter
            .ns
            .resolve_method(&Type::object(type_name), name)
            .ok()
            .flatten()
            .map(|method| opaque(&method.function.return_types)),
        Value::Range(_) | Value::Void | Value::Error(_) => None,
    };

    Ok(value.unwrap_or_else(|| {
        Value::error(format!(
            "No method `{}` found for type `{}`",
            name,
            receiver.type_name()
        ))
    }))
}

fn str_method(value: &str, name: &str, args: &Arguments) -> Option<Value> {
    let result = match name {
        "contains" => Value::Bool(value.contains(args.str(0)?)),
        "startswith" => Value::Bool(value.starts_with(args.str(0)?)),
        "endswith" => Value::Bool(value.ends_with(args.str(0)?)),
        "format" => {
            let formatted = FORMAT_INDEX.replace_all(value, |captures: &Captures| {
                captures[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| args.positional.get(idx))
                    .map_or_else(|| captures[0].to_string(), Value::to_display_string)
            });
            Value::Str(formatted.into_owned())
        }
        "join" => {
            let mut parts = vec![];
            for arg in &args.positional {
                flatten_strings(arg, &mut parts);
            }
            Value::Str(parts.join(value))
        }
        "replace" => Value::Str(value.replace(args.str(0)?, args.str(1)?)),
        "split" => {
            let parts: Vec<Value> = match args.str(0) {
                Some(separator) => value.split(separator).map(Value::str).collect(),
                None => value.split_whitespace().map(Value::str).collect(),
            };
            Value::list(parts)
        }
        "strip" => match args.str(0) {
            Some(chars) => Value::str(value.trim_matches(|c: char| chars.contains(c))),
            None => Value::str(value.trim()),
        },
        "substring" => {
            let chars = value.chars().collect::<Vec<_>>();
            let len = i64::try_from(chars.len()).unwrap_or(i64::MAX);
            let clamp = |idx: i64| {
                let idx = if idx < 0 { len + idx } else { idx };
                idx.clamp(0, len) as usize
            };
            let start = clamp(args.int(0).unwrap_or(0));
            let end = clamp(args.int(1).unwrap_or(len));
            let substring: String = if start < end {
                chars[start..end].iter().collect()
            } else {
                String::new()
            };
            Value::Str(substring)
        }
        "to_int" => match value.trim().parse::<i64>() {
            Ok(number) => Value::Int(number),
            Err(_) => Value::error(format!("'{}' is not a number", value)),
        },
        "to_lower" => Value::Str(value.to_lowercase()),
        "to_upper" => Value::Str(value.to_uppercase()),
        "underscorify" => Value::Str(
            value
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect(),
        ),
        "version_compare" => Value::Bool(version_compare(value, args.str(0)?)),
        _ => return None,
    };
    Some(result)
}

fn int_method(value: i64, name: &str) -> Option<Value> {
    match name {
        "is_even" => Some(Value::Bool(value % 2 == 0)),
        "is_odd" => Some(Value::Bool(value % 2 != 0)),
        "to_string" => Some(Value::Str(value.to_string())),
        _ => None,
    }
}

fn bool_method(value: bool, name: &str, args: &Arguments) -> Option<Value> {
    match name {
        "to_int" => Some(Value::Int(i64::from(value))),
        "to_string" => {
            let text = if value {
                args.str(0).unwrap_or("true")
            } else {
                args.str(1).unwrap_or("false")
            };
            Some(Value::str(text))
        }
        _ => None,
    }
}

fn list_method(items: &[Value], name: &str, args: &Arguments) -> Option<Value> {
    match name {
        "contains" => Some(Value::Bool(items.contains(args.positional.first()?))),
        "length" => Some(Value::Int(i64::try_from(items.len()).unwrap_or(i64::MAX))),
        "get" => {
            let idx = args.int(0)?;
            let item = list_index(items.len(), idx).map(|idx| items[idx].clone());
            Some(item.or_else(|| args.positional.get(1).cloned()).unwrap_or_else(|| {
                Value::error(format!("Index {} out of range", idx))
            }))
        }
        _ => None,
    }
}

fn dict_method(entries: &IndexMap<String, Value>, name: &str, args: &Arguments) -> Option<Value> {
    match name {
        "has_key" => Some(Value::Bool(entries.contains_key(args.str(0)?))),
        "keys" => {
            let mut keys = entries.keys().cloned().collect::<Vec<_>>();
            keys.sort();
            Some(Value::list(keys.into_iter().map(Value::Str).collect()))
        }
        "get" => {
            let key = args.str(0)?;
            Some(
                entries
                    .get(key)
                    .or_else(|| args.positional.get(1))
                    .cloned()
                    .unwrap_or_else(|| Value::error(format!("Key `{}` not found", key))),
            )
        }
        _ => None,
    }
}

/// Compares `version` against a constraint such as `>=1.2`. A constraint
/// without an operator tests for equality.
pub fn version_compare(version: &str, constraint: &str) -> bool {
    let constraint = constraint.trim();
    let (op, wanted) = ["==", "!=", ">=", "<=", ">", "<", "="]
        .iter()
        .find_map(|op| constraint.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("==", constraint));

    let ordering = compare_versions(version.trim(), wanted.trim());
    match op {
        "!=" => ordering != Ordering::Equal,
        ">=" => ordering != Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        ">" => ordering == Ordering::Greater,
        "<" => ordering == Ordering::Less,
        _ => ordering == Ordering::Equal,
    }
}

/// Component-wise comparison. Numeric components compare as numbers,
/// others as strings, and a missing component sorts first.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split(['.', '-']);
    let mut right = b.split(['.', '-']);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
