//! Parser module producing the concrete syntax tree.
//!
//! This module contains the parser that transforms a stream of tokens into a
//! concrete syntax tree shaped like the external meson grammar. It uses a
//! Pratt parser for expressions with proper operator precedence and handles:
//!
//! - Statement parsing (assignments, if/elif/else, foreach, break/continue)
//! - Expression parsing (binary ops, calls, method calls, subscripts, literals)
//! - Error recovery: a broken statement becomes an `ERROR` node
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod cst;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
