//! Tree-walking interpreter for the literal-evaluable subset of build files.
//!
//! This module executes a parsed file against concrete values. It handles:
//!
//! - Copy-on-write list and dict values
//! - Statements, with `break`/`continue` threaded through `Flow`
//! - Operators and the built-in functions and methods that can be folded
//! - External commands through a `ProcessRunner`

pub mod builtins;
pub mod expr;
pub mod interpreter;
pub mod process;
pub mod stmt;
pub mod value;

pub use interpreter::{interpret_file, InterpretResult, Interpreter};
pub use process::{ProcessRunner, SystemProcessRunner};
pub use value::{RunResult, Value};

#[cfg(test)]
mod tests;
