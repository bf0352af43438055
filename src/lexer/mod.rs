//! Lexical analysis module for the build language.
//!
//! This module contains the lexer (tokenizer) that converts a build
//! description into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using an ordered table of regex patterns
//! - Recognition of keywords, identifiers, integer and string literals
//! - Line/column tracking for every token
//! - Comments, line continuations and bracket-aware newlines

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
