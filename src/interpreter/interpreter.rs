//! Main interpreter module.
//!
//! This module contains the `Interpreter` structure that executes a parsed
//! build file against concrete values, and `interpret_file`, which runs one
//! file and turns its failures into diagnostics.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};

use crate::{
    analyzer::{cancel::CancellationToken, diagnostics::Diagnostic, options::Options},
    ast::ast::{Ast, NodeKind},
    errors::errors::Error,
    types::namespace::{namespace, TypeNamespace},
    Location,
};

use super::{
    process::ProcessRunner,
    stmt::{exec_block, Flow},
    value::Value,
};

/// Objects every build file can reference without defining them.
const PREDEFINED_OBJECTS: [&str; 4] = [
    "meson",
    "build_machine",
    "host_machine",
    "target_machine",
];

/// State of one interpretation.
///
/// This structure holds:
/// - The variable scope, one flat map per file
/// - The collaborators: namespace, options and process runner
/// - Error values and call-site failures met along the way
pub struct Interpreter<'a> {
    /// Signatures used to give unknown calls an opaque result
    pub ns: &'a TypeNamespace,
    /// Declared build options read by `get_option`
    pub options: &'a Options,
    /// Executes `run_command`
    pub runner: &'a dyn ProcessRunner,
    pub cancel: CancellationToken,
    /// Directory of the interpreted file, the working directory of commands
    pub source_dir: PathBuf,

    /// Variables defined so far
    pub scope: HashMap<String, Value>,
    /// Error values that reached a variable or a statement, with the
    /// location of the expression that produced them
    pub errors: Vec<(Location, String)>,
    /// Failures reported at a call site without aborting the file
    pub call_failures: Vec<(Location, Error)>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        ns: &'a TypeNamespace,
        options: &'a Options,
        runner: &'a dyn ProcessRunner,
        cancel: CancellationToken,
        source_dir: &Path,
    ) -> Self {
        let scope = PREDEFINED_OBJECTS
            .iter()
            .map(|name| (name.to_string(), Value::Object(name.to_string())))
            .collect();

        Interpreter {
            ns,
            options,
            runner,
            cancel,
            source_dir: source_dir.to_path_buf(),
            scope,
            errors: vec![],
            call_failures: vec![],
        }
    }

    /// Executes the statements of `ast`'s build definition in order.
    ///
    /// Returns the first fatal error. Statements after it are not executed.
    pub fn run(&mut self, ast: &Ast) -> Result<(), Error> {
        let root = match ast.kind(ast.root()) {
            NodeKind::SourceFile { build_definition } => *build_definition,
            _ => ast.root(),
        };
        let NodeKind::BuildDefinition { stmts } = ast.kind(root) else {
            return Ok(());
        };

        match exec_block(self, ast, stmts)? {
            Flow::Normal => {}
            flow => debug!("{:?} outside of a loop ignored", flow),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    pub(crate) fn record_error(&mut self, location: Location, message: &str) {
        self.errors.push((location, message.to_string()));
    }
}

/// Outcome of interpreting one file.
#[derive(Debug, Clone, Default)]
pub struct InterpretResult {
    pub scope: HashMap<String, Value>,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether a fatal error stopped the file early.
    pub aborted: bool,
}

impl InterpretResult {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }
}

/// Interprets `ast` with the built-in namespace.
///
/// Error values are reported as warnings where they were assigned or
/// discarded, call-site failures and the fatal error that ended the file as
/// errors.
#[instrument(skip_all, fields(file = %ast.file().display()))]
pub fn interpret_file(
    ast: &Ast,
    options: &Options,
    runner: &dyn ProcessRunner,
    cancel: &CancellationToken,
) -> InterpretResult {
    let source_dir = ast.file().parent().unwrap_or(Path::new("")).to_path_buf();
    let mut interpreter =
        Interpreter::new(namespace(), options, runner, cancel.clone(), &source_dir);
    let outcome = interpreter.run(ast);

    let mut diagnostics = interpreter
        .errors
        .iter()
        .map(|(location, message)| Diagnostic::warning(*location, message.clone()))
        .collect::<Vec<_>>();
    diagnostics.extend(
        interpreter
            .call_failures
            .iter()
            .map(|(location, error)| Diagnostic::error(*location, error.to_string())),
    );

    let aborted = match outcome {
        Ok(()) => false,
        Err(error) => {
            warn!("interpretation aborted: {}", error);
            diagnostics.push(Diagnostic::error(*error.get_location(), error.to_string()));
            true
        }
    };

    InterpretResult {
        scope: interpreter.scope,
        diagnostics,
        aborted,
    }
}
