//! Arena-backed abstract syntax tree for build-description files.
//!
//! - `ast`: node kinds, operators and the `Ast` arena
//! - `from_tree`: construction from the parser's syntax tree
//! - `patch`: rewriting of `subdir` calls into include nodes
//! - `visitor`: the `CodeVisitor` trait and traversal

use std::path::PathBuf;

use crate::parser::parser::parse_source;

pub mod ast;
pub mod from_tree;
pub mod patch;
pub mod visitor;

#[cfg(test)]
mod tests;

/// Parses `source` into a patched AST with parents set.
pub fn parse_ast(file: PathBuf, source: &str) -> ast::Ast {
    let tree = parse_source(source);
    from_tree::from_tree(file, &tree)
}
