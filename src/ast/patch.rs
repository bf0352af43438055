//! Rewrites `subdir(...)` calls into include nodes.
//!
//! A literal argument yields a `SubdirCall`. Anything else yields a
//! `MultiSubdirCall` whose candidates are guessed by walking backwards
//! through the enclosing statement lists for assignments to the variables
//! involved.

use tracing::debug;

use super::ast::{AssignmentOperator, Ast, BinaryOperator, NodeId, NodeKind};

/// Recursion guard for variables defined in terms of each other.
const MAX_SEARCH_DEPTH: usize = 16;

pub fn patch_subdirs(ast: &mut Ast) {
    let calls = (0..ast.len())
        .map(NodeId)
        .filter(|id| {
            matches!(ast.kind(*id), NodeKind::FunctionExpression { .. })
                && ast.function_name(*id) == Some("subdir")
        })
        .collect::<Vec<_>>();

    let mut replacements = vec![];
    for call in calls {
        let NodeKind::FunctionExpression { id, args } = ast.kind(call).clone() else {
            continue;
        };
        let Some(first) = ast.positional_argument(call, 0) else {
            continue;
        };

        let kind = match ast.string_value(first) {
            Some(dir) => NodeKind::SubdirCall {
                id,
                args,
                dir: dir.to_string(),
            },
            None => {
                let dirs = guess_directories(ast, first);
                debug!("subdir candidates at {}: {:?}", ast.location(call), dirs);
                NodeKind::MultiSubdirCall { id, args, dirs }
            }
        };
        replacements.push((call, kind));
    }

    // Children are unchanged, so parent edges stay valid once restored.
    for (call, kind) in replacements {
        ast.replace_kind(call, kind);
    }
    ast.set_parents();
}

/// Candidate string values for `expr`, deduplicated in discovery order.
pub fn guess_directories(ast: &Ast, expr: NodeId) -> Vec<String> {
    let mut result = vec![];
    for value in evaluate(ast, expr, 0) {
        if !result.contains(&value) {
            result.push(value);
        }
    }
    result
}

fn evaluate(ast: &Ast, expr: NodeId, depth: usize) -> Vec<String> {
    if depth > MAX_SEARCH_DEPTH {
        return vec![];
    }

    match ast.kind(expr) {
        NodeKind::StringLiteral { value, .. } => vec![value.clone()],
        NodeKind::ArrayLiteral { args } => args
            .iter()
            .flat_map(|arg| evaluate(ast, *arg, depth + 1))
            .collect(),
        NodeKind::IdExpression { id } => search_for(ast, id, expr, depth + 1),
        NodeKind::BinaryExpression { lhs, op, rhs }
            if matches!(op, BinaryOperator::Plus | BinaryOperator::Div) =>
        {
            let separator = if *op == BinaryOperator::Div { "/" } else { "" };
            let left = evaluate(ast, *lhs, depth + 1);
            let right = evaluate(ast, *rhs, depth + 1);
            left.iter()
                .flat_map(|l| right.iter().map(move |r| format!("{}{}{}", l, separator, r)))
                .collect()
        }
        NodeKind::ConditionalExpression {
            if_true, if_false, ..
        } => {
            let mut values = evaluate(ast, *if_true, depth + 1);
            values.extend(evaluate(ast, *if_false, depth + 1));
            values
        }
        _ => vec![],
    }
}

/// Statement lists of `parent` that may contain `child` as a direct element.
fn statement_lists(ast: &Ast, parent: NodeId) -> Vec<&Vec<NodeId>> {
    match ast.kind(parent) {
        NodeKind::BuildDefinition { stmts } => vec![stmts],
        NodeKind::SelectionStatement { blocks, .. } => blocks.iter().collect(),
        NodeKind::IterationStatement { block, .. } => vec![block],
        _ => vec![],
    }
}

/// Walks outwards from `from`, collecting values assigned to `name` by
/// statements that precede it.
fn search_for(ast: &Ast, name: &str, from: NodeId, depth: usize) -> Vec<String> {
    let mut result = vec![];
    let mut current = from;

    while let Some(parent) = ast.parent(current) {
        if let NodeKind::IterationStatement {
            ids, expression, ..
        } = ast.kind(parent)
        {
            let is_loop_variable = ids.len() == 1 && ast.id_name(ids[0]) == Some(name);
            if is_loop_variable && *expression != current {
                result.extend(evaluate(ast, *expression, depth + 1));
                return result;
            }
        }

        for list in statement_lists(ast, parent) {
            let Some(position) = list.iter().position(|stmt| *stmt == current) else {
                continue;
            };
            for stmt in list[..position].iter().rev() {
                if collect_assignments(ast, name, *stmt, depth, &mut result) {
                    return result;
                }
            }
        }

        current = parent;
    }

    result
}

/// Adds values `stmt` assigns to `name`. Returns true once a plain `=`
/// assignment ends the search.
fn collect_assignments(
    ast: &Ast,
    name: &str,
    stmt: NodeId,
    depth: usize,
    result: &mut Vec<String>,
) -> bool {
    match ast.kind(stmt) {
        NodeKind::AssignmentStatement { lhs, op, rhs } if ast.id_name(*lhs) == Some(name) => {
            result.extend(evaluate(ast, *rhs, depth + 1));
            *op == AssignmentOperator::Equals
        }
        NodeKind::SelectionStatement { blocks, .. } => {
            for block in blocks {
                for nested in block.iter().rev() {
                    if collect_assignments(ast, name, *nested, depth, result) {
                        break;
                    }
                }
            }
            false
        }
        NodeKind::IterationStatement { block, .. } => {
            for nested in block.iter().rev() {
                if collect_assignments(ast, name, *nested, depth, result) {
                    break;
                }
            }
            false
        }
        _ => false,
    }
}
