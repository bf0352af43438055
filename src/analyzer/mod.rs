//! Flow-sensitive type inference over build-description files.
//!
//! This module computes, for every expression, the set of types it may
//! evaluate to. It:
//!
//! - Tracks a scope of identifier types through assignments, branches and loops
//! - Derives call results from signatures and per-callee rules
//! - Checks call arguments against the built-in signatures
//! - Follows `subdir` includes and `subproject` calls across files
//! - Collects diagnostics per file
//!
//! `MesonTree` is the entry point for a whole project, `analyze_ast` for a
//! single file.

pub mod analyzer;
pub mod cancel;
pub mod config;
pub mod derivations;
pub mod diagnostics;
pub mod options;
pub mod scope;
pub mod subproject;
pub mod tree;

pub use analyzer::{analyze_ast, AnalysisResult, TypeAnalyzer};
pub use tree::MesonTree;
