use std::path::PathBuf;

use tracing::debug;

use crate::{
    lexer::lexer::parse_integer,
    parser::cst::{SyntaxKind, SyntaxNode},
    Location,
};

use super::{
    ast::{AssignmentOperator, Ast, BinaryOperator, NodeId, NodeKind, UnaryOperator},
    patch::patch_subdirs,
};

/// Builds the arena for `file` from a syntax tree.
///
/// Never fails: malformed or missing pieces become `ErrorNode`s carrying a
/// human-readable message. Parents are set and `subdir` calls are patched
/// before the tree is returned.
pub fn from_tree(file: PathBuf, root: &SyntaxNode) -> Ast {
    let mut builder = TreeBuilder {
        ast: Ast::new(file),
    };
    let root = builder.source_file(root);
    let mut ast = builder.ast;
    ast.set_root(root);
    ast.set_parents();
    patch_subdirs(&mut ast);
    debug!("built ast for {:?} with {} nodes", ast.file(), ast.len());
    ast
}

struct TreeBuilder {
    ast: Ast,
}

impl TreeBuilder {
    fn error(&mut self, location: Location, message: impl Into<String>) -> NodeId {
        self.ast.add(
            NodeKind::ErrorNode {
                message: message.into(),
            },
            location,
        )
    }

    fn source_file(&mut self, node: &SyntaxNode) -> NodeId {
        let build_definition = match node.children.as_slice() {
            [] => self.error(node.location, "Expected build_definition, got nothing!"),
            [child] if child.kind == SyntaxKind::BuildDefinition => self.build(child),
            [child] => self.error(
                child.location,
                format!("Expected build_definition, got {}", child.kind),
            ),
            _ => self.error(node.location, "Got too many children of a sourcefile!"),
        };
        self.ast
            .add(NodeKind::SourceFile { build_definition }, node.location)
    }

    /// The node stored in `field`, or an error node naming what is missing.
    fn field(&mut self, node: &SyntaxNode, field: &str) -> NodeId {
        match node.child_by_field_name(field) {
            Some(child) => self.build(child),
            None => self.error(
                node.location,
                format!("Missing `{}` in {}", field, node.kind),
            ),
        }
    }

    fn optional_field(&mut self, node: &SyntaxNode, field: &str) -> Option<NodeId> {
        node.child_by_field_name(field).map(|child| self.build(child))
    }

    fn list(&mut self, children: &[SyntaxNode]) -> Vec<NodeId> {
        children
            .iter()
            .filter(|child| child.kind != SyntaxKind::Keyword)
            .map(|child| self.build(child))
            .collect()
    }

    fn block(&mut self, block: &SyntaxNode) -> Vec<NodeId> {
        if block.kind == SyntaxKind::Block {
            self.list(&block.children)
        } else {
            vec![self.build(block)]
        }
    }

    fn build(&mut self, node: &SyntaxNode) -> NodeId {
        let kind = match node.kind {
            SyntaxKind::SourceFile => return self.source_file(node),
            SyntaxKind::BuildDefinition => NodeKind::BuildDefinition {
                stmts: self.list(&node.children),
            },
            SyntaxKind::AssignmentStatement => {
                let Some(op) = AssignmentOperator::from_str(&node.text) else {
                    return self.error(
                        node.location,
                        format!("Unknown assignment operator `{}`", node.text),
                    );
                };
                NodeKind::AssignmentStatement {
                    lhs: self.field(node, "left"),
                    op,
                    rhs: self.field(node, "right"),
                }
            }
            SyntaxKind::SelectionStatement => {
                let conditions = node
                    .children_by_field_name("condition")
                    .map(|condition| self.build(condition))
                    .collect::<Vec<_>>();
                let blocks = node
                    .children_by_field_name("block")
                    .map(|block| self.block(block))
                    .collect::<Vec<_>>();
                if conditions.is_empty()
                    || (blocks.len() != conditions.len() && blocks.len() != conditions.len() + 1)
                {
                    return self.error(node.location, "Malformed selection statement");
                }
                NodeKind::SelectionStatement { conditions, blocks }
            }
            SyntaxKind::IterationStatement => {
                let ids = node
                    .children_by_field_name("id")
                    .map(|id| self.build(id))
                    .collect::<Vec<_>>();
                if ids.is_empty() || ids.len() > 2 {
                    return self.error(
                        node.location,
                        format!("Expected one or two loop variables, got {}", ids.len()),
                    );
                }
                let expression = self.field(node, "expression");
                let block = match node.child_by_field_name("block") {
                    Some(block) => self.block(block),
                    None => vec![],
                };
                NodeKind::IterationStatement {
                    ids,
                    expression,
                    block,
                }
            }
            SyntaxKind::JumpStatement => match node.text.as_str() {
                "break" => NodeKind::BreakStatement,
                "continue" => NodeKind::ContinueStatement,
                other => {
                    return self.error(node.location, format!("Unknown jump statement `{}`", other))
                }
            },
            SyntaxKind::FunctionExpression => NodeKind::FunctionExpression {
                id: self.field(node, "function"),
                args: self.optional_field(node, "arguments"),
            },
            SyntaxKind::MethodExpression => NodeKind::MethodExpression {
                obj: self.field(node, "object"),
                id: self.field(node, "name"),
                args: self.optional_field(node, "arguments"),
            },
            SyntaxKind::ArgumentList => NodeKind::ArgumentList {
                args: self.list(&node.children),
            },
            SyntaxKind::KeywordItem => NodeKind::KeywordItem {
                key: self.field(node, "key"),
                value: self.field(node, "value"),
            },
            SyntaxKind::KeyValueItem => NodeKind::KeyValueItem {
                key: self.field(node, "key"),
                value: self.field(node, "value"),
            },
            SyntaxKind::ConditionalExpression => NodeKind::ConditionalExpression {
                condition: self.field(node, "condition"),
                if_true: self.field(node, "true"),
                if_false: self.field(node, "false"),
            },
            SyntaxKind::UnaryExpression => {
                let Some(op) = UnaryOperator::from_str(&node.text) else {
                    return self.error(
                        node.location,
                        format!("Unknown unary operator `{}`", node.text),
                    );
                };
                NodeKind::UnaryExpression {
                    op,
                    expression: self.field(node, "argument"),
                }
            }
            SyntaxKind::SubscriptExpression => NodeKind::SubscriptExpression {
                outer: self.field(node, "object"),
                inner: self.field(node, "index"),
            },
            SyntaxKind::BinaryExpression => {
                let Some(op) = BinaryOperator::from_str(&node.text) else {
                    return self.error(
                        node.location,
                        format!("Unknown binary operator `{}`", node.text),
                    );
                };
                NodeKind::BinaryExpression {
                    lhs: self.field(node, "left"),
                    op,
                    rhs: self.field(node, "right"),
                }
            }
            SyntaxKind::StringLiteral => NodeKind::StringLiteral {
                value: node.text.clone(),
                is_format: node.is_format,
            },
            SyntaxKind::IntegerLiteral => match parse_integer(&node.text) {
                Some(value) => NodeKind::IntegerLiteral { value },
                None => {
                    return self.error(
                        node.location,
                        format!("Invalid integer literal `{}`", node.text),
                    )
                }
            },
            SyntaxKind::BooleanLiteral => NodeKind::BooleanLiteral {
                value: node.text == "true",
            },
            SyntaxKind::IdExpression => NodeKind::IdExpression {
                id: node.text.clone(),
            },
            SyntaxKind::ArrayLiteral => NodeKind::ArrayLiteral {
                args: self.list(&node.children),
            },
            SyntaxKind::DictionaryLiteral => NodeKind::DictionaryLiteral {
                values: self.list(&node.children),
            },
            SyntaxKind::Error => NodeKind::ErrorNode {
                message: node.text.clone(),
            },
            SyntaxKind::Block | SyntaxKind::Keyword => {
                return self.error(
                    node.location,
                    format!("Unexpected {} outside of a statement", node.kind),
                )
            }
        };

        self.ast.add(kind, node.location)
    }
}
