use std::{fmt::Display, rc::Rc};

use indexmap::IndexMap;

use crate::{
    analyzer::options::{MesonOption, OptionKind, OptionValue},
    types::types::{Type, TypeSet},
};

/// Output of an external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunResult {
    pub returncode: i64,
    pub stdout: String,
    pub stderr: String,
}

/// The integers `start, start + step, ...` below `stop`, produced on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    /// Always positive.
    pub step: i64,
}

impl RangeValue {
    pub fn len(&self) -> usize {
        if self.start >= self.stop {
            return 0;
        }
        let (start, stop, step) = (self.start as i128, self.stop as i128, self.step as i128);
        usize::try_from((stop - start + step - 1) / step).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<i64> {
        if idx >= self.len() {
            return None;
        }
        let value = self.start as i128 + idx as i128 * self.step as i128;
        i64::try_from(value).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> {
        let RangeValue { start, stop, step } = *self;
        std::iter::successors(Some(start), move |current| current.checked_add(step))
            .take_while(move |current| *current < stop)
    }
}

/// A concrete value produced by the interpreter.
///
/// Lists and dicts share their storage until one holder writes to it
/// (`Rc::make_mut`), so a plain clone behaves like a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Rc<Vec<Value>>),
    Dict(Rc<IndexMap<String, Value>>),
    RunResult(Rc<RunResult>),
    Range(RangeValue),
    /// Handle to an object the interpreter cannot fold, by type name.
    Object(String),
    Disabler,
    Void,
    /// An evaluation error. Any expression consuming it becomes this error.
    Error(String),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Value {
        Value::Str(value.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn dict(entries: IndexMap<String, Value>) -> Value {
        Value::Dict(Rc::new(entries))
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// The static type this value belongs to.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Str(_) => Type::Str,
            Value::List(items) => Type::list(items.iter().map(Value::type_of).collect()),
            Value::Dict(entries) => Type::dict(entries.values().map(Value::type_of).collect()),
            Value::RunResult(_) => Type::object("runresult"),
            Value::Range(_) => Type::object("range"),
            Value::Object(name) => Type::object(name),
            Value::Disabler => Type::object("disabler"),
            Value::Void | Value::Error(_) => Type::Void,
        }
    }

    pub fn type_name(&self) -> String {
        self.type_of().name()
    }

    /// The value as printed by `message()` and substituted into format
    /// strings. Strings are printed without quotes at the top level.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(value) => value.clone(),
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "'{}'", value),
            Value::List(items) => {
                let items = items.iter().map(Value::to_string).collect::<Vec<_>>();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Dict(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| format!("'{}': {}", key, value))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::RunResult(_) => write!(f, "<runresult>"),
            Value::Range(range) => write!(f, "range({}, {}, {})", range.start, range.stop, range.step),
            Value::Object(name) => write!(f, "<{}>", name),
            Value::Disabler => write!(f, "<disabler>"),
            Value::Void => write!(f, "void"),
            Value::Error(message) => write!(f, "<error: {}>", message),
        }
    }
}

/// The value `get_option` yields for a declared option.
pub fn option_value(option: &MesonOption) -> Value {
    if option.kind == OptionKind::Feature {
        return Value::Object(String::from("feature"));
    }
    match option.default_value() {
        OptionValue::Bool(value) => Value::Bool(value),
        OptionValue::Int(value) => Value::Int(value),
        OptionValue::Str(value) => Value::Str(value),
        OptionValue::Array(items) => Value::list(items.into_iter().map(Value::Str).collect()),
    }
}

/// Union of the types of `values`.
pub fn types_of<'a>(values: impl IntoIterator<Item = &'a Value>) -> TypeSet {
    values.into_iter().map(Value::type_of).collect()
}
