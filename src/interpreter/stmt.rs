use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::ast::{AssignmentOperator, Ast, NodeId, NodeKind},
    errors::errors::Error,
    Location,
};

use super::{
    expr::{binary_operation, eval_expression, list_index},
    interpreter::Interpreter,
    value::Value,
};

/// How control leaves a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
}

/// Executes `stmts` until one of them breaks or continues.
pub fn exec_block(
    interpreter: &mut Interpreter,
    ast: &Ast,
    stmts: &[NodeId],
) -> Result<Flow, Error> {
    for stmt in stmts {
        match exec_statement(interpreter, ast, *stmt)? {
            Flow::Normal => {}
            flow => return Ok(flow),
        }
    }
    Ok(Flow::Normal)
}

pub fn exec_statement(
    interpreter: &mut Interpreter,
    ast: &Ast,
    stmt: NodeId,
) -> Result<Flow, Error> {
    match ast.kind(stmt) {
        NodeKind::AssignmentStatement { lhs, op, rhs } => {
            exec_assignment(interpreter, ast, *lhs, *op, *rhs)?;
            Ok(Flow::Normal)
        }
        NodeKind::SelectionStatement { conditions, blocks } => {
            for (idx, condition) in conditions.iter().enumerate() {
                match eval_expression(interpreter, ast, *condition)? {
                    Value::Bool(true) => {
                        let block = blocks.get(idx).map(Vec::as_slice).unwrap_or(&[]);
                        return exec_block(interpreter, ast, block);
                    }
                    Value::Bool(false) => {}
                    Value::Error(message) => {
                        interpreter.record_error(ast.location(*condition), &message);
                        return Ok(Flow::Normal);
                    }
                    other => {
                        let message = format!("Condition is `{}`, not bool", other.type_name());
                        interpreter.record_error(ast.location(*condition), &message);
                        return Ok(Flow::Normal);
                    }
                }
            }
            match blocks.get(conditions.len()) {
                Some(else_block) => exec_block(interpreter, ast, else_block),
                None => Ok(Flow::Normal),
            }
        }
        NodeKind::IterationStatement {
            ids,
            expression,
            block,
        } => {
            exec_iteration(interpreter, ast, ids, *expression, block)?;
            Ok(Flow::Normal)
        }
        NodeKind::BreakStatement => Ok(Flow::Break),
        NodeKind::ContinueStatement => Ok(Flow::Continue),
        _ => {
            if let Value::Error(message) = eval_expression(interpreter, ast, stmt)? {
                interpreter.record_error(ast.location(stmt), &message);
            }
            Ok(Flow::Normal)
        }
    }
}

fn exec_assignment(
    interpreter: &mut Interpreter,
    ast: &Ast,
    lhs: NodeId,
    op: AssignmentOperator,
    rhs: NodeId,
) -> Result<(), Error> {
    let value = eval_expression(interpreter, ast, rhs)?;
    let location = ast.location(rhs);

    match ast.kind(lhs) {
        NodeKind::IdExpression { id: name } => {
            let value = match op.binary() {
                None => value,
                Some(binary) => {
                    let current = interpreter
                        .scope
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| Value::error(format!("Unknown identifier `{}`", name)));
                    binary_operation(binary, current, value)
                }
            };
            if let Value::Error(message) = &value {
                interpreter.record_error(location, message);
            }
            trace!("{} = {}", name, value);
            interpreter.scope.insert(name.clone(), value);
        }
        NodeKind::SubscriptExpression { outer, inner } => {
            let Some(name) = ast.id_name(*outer) else {
                interpreter.record_error(ast.location(lhs), "Can only assign to variables");
                return Ok(());
            };
            let key = eval_expression(interpreter, ast, *inner)?;
            if let Err(message) = assign_element(interpreter, name, key, op, value) {
                interpreter.record_error(location, &message);
            }
        }
        _ => interpreter.record_error(ast.location(lhs), "Can only assign to variables"),
    }
    Ok(())
}

/// Writes `container[key]`. The container is copied first if anything else
/// still shares it.
fn assign_element(
    interpreter: &mut Interpreter,
    name: &str,
    key: Value,
    op: AssignmentOperator,
    value: Value,
) -> Result<(), String> {
    let Some(container) = interpreter.scope.get_mut(name) else {
        return Err(format!("Unknown identifier `{}`", name));
    };
    let combine = |current: Option<&Value>| match op.binary() {
        None => value.clone(),
        Some(binary) => {
            let current = current.cloned().unwrap_or(Value::Void);
            binary_operation(binary, current, value.clone())
        }
    };

    let stored = match (container, key) {
        (Value::Dict(entries), Value::Str(key)) => {
            let entries = Rc::make_mut(entries);
            let new = combine(entries.get(&key));
            entries.insert(key, new.clone());
            new
        }
        (Value::List(items), Value::Int(idx)) => {
            let Some(idx) = list_index(items.len(), idx) else {
                return Err(format!("Index {} out of range", idx));
            };
            let items = Rc::make_mut(items);
            let new = combine(items.get(idx));
            items[idx] = new.clone();
            new
        }
        (container, key) => {
            return Err(format!(
                "Unable to assign to `{}` with a `{}` key",
                container.type_name(),
                key.type_name()
            ))
        }
    };

    match stored {
        Value::Error(message) => Err(message),
        _ => Ok(()),
    }
}

fn exec_iteration(
    interpreter: &mut Interpreter,
    ast: &Ast,
    ids: &[NodeId],
    expression: NodeId,
    block: &[NodeId],
) -> Result<(), Error> {
    let names = ids
        .iter()
        .filter_map(|id| ast.id_name(*id))
        .map(str::to_string)
        .collect::<Vec<_>>();
    let location = ast.location(expression);

    let bindings: Vec<Vec<Value>> = match eval_expression(interpreter, ast, expression)? {
        Value::Range(range) if names.len() == 1 => {
            for value in range.iter() {
                let values = vec![Value::Int(value)];
                if exec_loop_body(interpreter, ast, &names, values, block, location)? == Flow::Break {
                    break;
                }
            }
            return Ok(());
        }
        Value::List(items) if names.len() == 1 => {
            items.iter().map(|item| vec![item.clone()]).collect()
        }
        Value::Dict(entries) if names.len() == 2 => entries
            .iter()
            .map(|(key, value)| vec![Value::str(key.as_str()), value.clone()])
            .collect(),
        Value::List(_) | Value::Range(_) => {
            interpreter.record_error(
                location,
                "Iterating over a list requires exactly one identifier",
            );
            return Ok(());
        }
        Value::Dict(_) => {
            interpreter.record_error(
                location,
                "Iterating over a dict requires exactly two identifiers",
            );
            return Ok(());
        }
        Value::Error(message) => {
            interpreter.record_error(location, &message);
            return Ok(());
        }
        other => {
            let message = format!("Unable to iterate over `{}`", other.type_name());
            interpreter.record_error(location, &message);
            return Ok(());
        }
    };

    for values in bindings {
        if exec_loop_body(interpreter, ast, &names, values, block, location)? == Flow::Break {
            break;
        }
    }
    Ok(())
}

/// Binds one iteration's values and runs the loop body once.
fn exec_loop_body(
    interpreter: &mut Interpreter,
    ast: &Ast,
    names: &[String],
    values: Vec<Value>,
    block: &[NodeId],
    location: Location,
) -> Result<Flow, Error> {
    interpreter.cancel.check(location)?;
    for (name, value) in names.iter().zip(values) {
        interpreter.scope.insert(name.clone(), value);
    }
    exec_block(interpreter, ast, block)
}
