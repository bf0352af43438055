//! Error types and error handling for the analyzer.
//!
//! This module defines the error types used throughout the crate. It includes:
//!
//! - Error structures with source location information
//! - Specific error variants for lexing, parsing, type lookup and interpretation
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions
//!
//! Errors are values: the syntax and type layers return them, and only the
//! inference engine and the interpreter turn them into diagnostics.

pub mod errors;

#[cfg(test)]
mod tests;
