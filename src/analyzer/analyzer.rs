use std::{
    collections::{BTreeSet, HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::{
    ast::{
        ast::{AssignmentOperator, Ast, BinaryOperator, NodeId, NodeKind, UnaryOperator},
        visitor::CodeVisitor,
    },
    types::{
        function::{Function, Method},
        namespace::TypeNamespace,
        types::{Type, TypeSet},
    },
    Location, TYPES,
};

use super::{
    cancel::CancellationToken,
    config::AnalysisOptions,
    derivations::{derivations, CallContext, TypeDerivations},
    diagnostics::Diagnostic,
    options::Options,
    scope::Scope,
};

lazy_static! {
    static ref SNAKE_CASE: Regex = Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap();
    static ref FORMAT_VARIABLE: Regex = Regex::new(r"@([a-zA-Z_][a-zA-Z0-9_]*)@").unwrap();
    static ref FORMAT_INDEX: Regex = Regex::new(r"@(\d+)@").unwrap();
}

/// Functions whose only effect is their result.
const PURE_FUNCTIONS: &[&str] = &[
    "disabler",
    "environment",
    "files",
    "generator",
    "get_variable",
    "import",
    "include_directories",
    "is_disabler",
    "is_variable",
    "join_paths",
    "structured_sources",
];

/// Methods whose only effect is their result.
const PURE_METHODS: &[&str] = &[
    "build_machine.cpu",
    "build_machine.cpu_family",
    "build_machine.endian",
    "build_machine.system",
    "meson.backend",
    "meson.build_options",
    "meson.build_root",
    "meson.can_run_host_binaries",
    "meson.current_build_dir",
    "meson.current_source_dir",
    "meson.get_cross_property",
    "meson.get_external_property",
    "meson.global_build_root",
    "meson.global_source_root",
    "meson.has_exe_wrapper",
    "meson.has_external_property",
    "meson.is_cross_build",
    "meson.is_subproject",
    "meson.is_unity",
    "meson.project_build_root",
    "meson.project_license",
    "meson.project_license_files",
    "meson.project_name",
    "meson.project_source_root",
    "meson.project_version",
    "meson.source_root",
    "meson.version",
    "both_libs.get_shared_lib",
    "both_libs.get_static_lib",
    "build_tgt.extract_all_objects",
    "build_tgt.extract_objects",
    "build_tgt.found",
    "build_tgt.full_path",
    "build_tgt.name",
    "build_tgt.path",
    "build_tgt.private_dir_include",
    "cfg_data.get",
    "cfg_data.get_unquoted",
    "cfg_data.has",
    "cfg_data.keys",
    "custom_idx.full_path",
    "custom_tgt.full_path",
    "custom_tgt.to_list",
    "dep.as_link_whole",
    "dep.as_system",
    "dep.found",
    "dep.get_configtool_variable",
    "dep.get_pkgconfig_variable",
    "dep.get_variable",
    "dep.include_type",
    "dep.name",
    "dep.partial_dependency",
    "dep.type_name",
    "dep.version",
    "disabler.found",
    "external_program.found",
    "external_program.full_path",
    "external_program.path",
    "external_program.version",
    "feature.allowed",
    "feature.auto",
    "feature.disabled",
    "feature.enabled",
    "module.found",
    "runresult.compiled",
    "runresult.returncode",
    "runresult.stderr",
    "runresult.stdout",
    "subproject.found",
    "subproject.get_variable",
    "str.contains",
    "str.endswith",
    "str.format",
    "str.join",
    "str.replace",
    "str.split",
    "str.startswith",
    "str.strip",
    "str.substring",
    "str.to_lower",
    "str.to_upper",
    "str.underscorify",
    "str.version_compare",
    "bool.to_int",
    "bool.to_string",
    "dict.get",
    "dict.has_key",
    "dict.keys",
    "int.is_even",
    "int.is_odd",
    "int.to_string",
    "list.contains",
    "list.get",
    "list.length",
];

/// An `=` assignment whose value has not been read yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAssignment {
    pub file: PathBuf,
    pub location: Location,
    pub name: String,
    seq: usize,
}

/// What an analyzed include hands back to the including file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncludedFile {
    /// Exit scope of the included file.
    pub scope: Scope,
    /// Every variable name the included file read.
    pub reads: BTreeSet<String>,
    /// Assignments still unread when the included file ended.
    pub unused: Vec<PendingAssignment>,
}

impl From<Scope> for IncludedFile {
    fn from(scope: Scope) -> Self {
        IncludedFile {
            scope,
            ..IncludedFile::default()
        }
    }
}

/// What including a subdirectory contributed.
#[derive(Debug, Clone, PartialEq)]
pub enum IncludeOutcome {
    Analyzed(IncludedFile),
    Cyclic,
    Missing(PathBuf),
    /// Not analyzed, without an error: depth limit or no resolver.
    Skipped,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubprojectOutcome {
    /// The subproject's root exit scope.
    Found(Scope),
    NotFound,
    Disabled,
    Cancelled,
}

/// Resolves the files and subprojects a build file refers to.
pub trait IncludeResolver {
    /// Analyzes `dir/meson.build` relative to the directory of `from`,
    /// seeded with the including file's current scope.
    fn include(&mut self, from: &Path, dir: &str, scope: &Scope) -> IncludeOutcome;

    fn subproject(&mut self, name: &str) -> SubprojectOutcome;
}

/// Resolver for analyzing a single file on its own.
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn include(&mut self, _from: &Path, _dir: &str, _scope: &Scope) -> IncludeOutcome {
        IncludeOutcome::Skipped
    }

    fn subproject(&mut self, _name: &str) -> SubprojectOutcome {
        SubprojectOutcome::Disabled
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Inferred types per node.
    pub types: HashMap<NodeId, TypeSet>,
    /// Scope at the end of the file.
    pub scope: Scope,
    pub diagnostics: Vec<Diagnostic>,
    /// Variable names read while analyzing, includes included.
    pub reads: BTreeSet<String>,
    /// Unread assignments not reported in `diagnostics`: all of them for a
    /// nested run, those of other files for the root run.
    pub unused: Vec<PendingAssignment>,
    pub cancelled: bool,
}

impl AnalysisResult {
    pub fn types_of(&self, id: NodeId) -> Option<&TypeSet> {
        self.types.get(&id)
    }

    /// Writes the inferred types into the nodes' type slots.
    pub fn apply(&self, ast: &mut Ast) {
        for (id, types) in &self.types {
            ast.set_types(*id, types.clone());
        }
    }
}

/// Infers the possible types of every expression of one file.
///
/// A single top-to-bottom pass. Branches are analyzed on copies of the
/// entry scope and unioned afterwards; loop bodies run once and their exit
/// scope is unioned into the entry scope. Includes and subprojects are
/// delegated to an `IncludeResolver`.
pub struct TypeAnalyzer<'a> {
    ns: &'a TypeNamespace,
    derivations: &'a TypeDerivations,
    options: &'a Options,
    config: &'a AnalysisOptions,
    resolver: &'a mut dyn IncludeResolver,
    cancel: CancellationToken,
    scope: Scope,
    types: HashMap<NodeId, TypeSet>,
    diagnostics: Vec<Diagnostic>,
    /// Variables holding the result of `subproject('name')`.
    subproject_vars: HashMap<String, String>,
    subproject_scopes: HashMap<String, Scope>,
    /// Method calls that only produce a value.
    pure_calls: HashSet<NodeId>,
    pending: Vec<PendingAssignment>,
    next_pending: usize,
    reads: BTreeSet<String>,
    /// Reads in order, kept while inside a loop body.
    read_log: Vec<String>,
    loop_depth: usize,
    report_unused: bool,
    cancelled: bool,
}

impl<'a> TypeAnalyzer<'a> {
    pub fn new(
        ns: &'a TypeNamespace,
        derivations: &'a TypeDerivations,
        options: &'a Options,
        config: &'a AnalysisOptions,
        resolver: &'a mut dyn IncludeResolver,
        cancel: CancellationToken,
    ) -> Self {
        TypeAnalyzer {
            ns,
            derivations,
            options,
            config,
            resolver,
            cancel,
            scope: Scope::root(),
            types: HashMap::new(),
            diagnostics: vec![],
            subproject_vars: HashMap::new(),
            subproject_scopes: HashMap::new(),
            pure_calls: HashSet::new(),
            pending: vec![],
            next_pending: 0,
            reads: BTreeSet::new(),
            read_log: vec![],
            loop_depth: 0,
            report_unused: true,
            cancelled: false,
        }
    }

    /// Analyzes an included file: unread assignments are handed back to the
    /// including file instead of being reported.
    pub fn nested(mut self) -> Self {
        self.report_unused = false;
        self
    }

    /// Starts from `scope` instead of the root scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn run(mut self, ast: &Ast) -> AnalysisResult {
        ast.visit(ast.root(), &mut self);
        debug!(
            "analyzed {:?}: {} typed nodes, {} diagnostics{}",
            ast.file(),
            self.types.len(),
            self.diagnostics.len(),
            if self.cancelled { ", cancelled" } else { "" }
        );
        let unused = self.report_unused_assignments(ast);
        AnalysisResult {
            types: self.types,
            scope: self.scope,
            diagnostics: self.diagnostics,
            reads: self.reads,
            unused,
            cancelled: self.cancelled,
        }
    }

    /// Reports this file's unread assignments and returns the rest.
    fn report_unused_assignments(&mut self, ast: &Ast) -> Vec<PendingAssignment> {
        let pending = std::mem::take(&mut self.pending);
        if !self.report_unused {
            return pending;
        }
        if self.cancelled || !self.config.check_unused_variables {
            return vec![];
        }

        let mut seen = HashSet::new();
        let mut others = vec![];
        for assignment in pending {
            if !seen.insert((assignment.file.clone(), assignment.location)) {
                continue;
            }
            if assignment.file == *ast.file() {
                self.diagnostics
                    .push(Diagnostic::warning(assignment.location, "Unused assignment"));
            } else {
                others.push(assignment);
            }
        }
        others
    }

    fn mark_read(&mut self, name: &str) {
        self.pending.retain(|pending| pending.name != name);
        if self.loop_depth > 0 {
            self.read_log.push(name.to_string());
        }
        if !self.reads.contains(name) {
            self.reads.insert(name.to_string());
        }
    }

    fn add_pending(&mut self, file: &Path, location: Location, name: &str) {
        self.pending.push(PendingAssignment {
            file: file.to_path_buf(),
            location,
            name: name.to_string(),
            seq: self.next_pending,
        });
        self.next_pending += 1;
    }

    fn eval(&mut self, ast: &Ast, id: NodeId) -> TypeSet {
        ast.visit(id, self);
        self.types.get(&id).cloned().unwrap_or_default()
    }

    fn record(&mut self, id: NodeId, types: TypeSet) {
        self.types.entry(id).or_default().union(&types);
    }

    fn error(&mut self, ast: &Ast, id: NodeId, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(ast.location(id), message));
    }

    fn warning(&mut self, ast: &Ast, id: NodeId, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning(ast.location(id), message));
    }

    fn check_cancelled(&mut self, ast: &Ast, id: NodeId) -> bool {
        if !self.cancelled {
            if let Err(error) = self.cancel.check(ast.location(id)) {
                debug!("{} in {:?}", error, ast.file());
                self.cancelled = true;
            }
        }
        self.cancelled
    }

    fn visit_block(&mut self, ast: &Ast, stmts: &[NodeId]) {
        for stmt in stmts {
            if self.cancelled {
                return;
            }
            ast.visit(*stmt, self);
            self.check_no_effect(ast, *stmt);
        }
    }

    fn check_no_effect(&mut self, ast: &Ast, stmt: NodeId) {
        let no_effect = match ast.kind(stmt) {
            NodeKind::IntegerLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::ArrayLiteral { .. }
            | NodeKind::DictionaryLiteral { .. } => true,
            NodeKind::FunctionExpression { .. } => ast
                .function_name(stmt)
                .is_some_and(|name| PURE_FUNCTIONS.contains(&name)),
            NodeKind::MethodExpression { .. } => self.pure_calls.contains(&stmt),
            _ => false,
        };
        if no_effect {
            self.warning(
                ast,
                stmt,
                "Statement does not have an effect or the result to the call is unused",
            );
        }
    }

    /// Statements after a top-level `error()` or `subdir_done()`.
    fn check_dead_code(&mut self, ast: &Ast, stmts: &[NodeId]) {
        let Some(end) = stmts.iter().position(|stmt| {
            matches!(ast.kind(*stmt), NodeKind::FunctionExpression { .. })
                && matches!(ast.function_name(*stmt), Some("error" | "subdir_done"))
        }) else {
            return;
        };
        let dead = &stmts[end + 1..];
        if let (Some(first), Some(last)) = (dead.first(), dead.last()) {
            let location = ast.location(*first).to(&ast.location(*last));
            self.diagnostics.push(Diagnostic::warning(location, "Dead code"));
        }
    }

    /// `'...'.format(...)` on a literal template.
    fn check_format(&mut self, ast: &Ast, call: NodeId, template: NodeId, args: Option<NodeId>) {
        let Some(value) = ast.string_value(template) else {
            return;
        };
        let found = FORMAT_INDEX
            .captures_iter(value)
            .filter_map(|captures| captures[1].parse::<usize>().ok())
            .collect::<BTreeSet<_>>();
        let args = match args.map(|args| ast.kind(args)) {
            Some(NodeKind::ArgumentList { args }) => args.clone(),
            _ => vec![],
        };

        for (idx, arg) in args.iter().enumerate() {
            if !found.contains(&idx) {
                self.warning(ast, *arg, "Unused parameter in format() call");
            }
        }
        if found.is_empty() {
            self.warning(ast, call, "Pointless str.format() call");
            return;
        }

        let out_of_bounds = found
            .iter()
            .filter(|idx| **idx >= args.len())
            .map(|idx| format!("@{}@", idx))
            .collect::<Vec<_>>();
        if !out_of_bounds.is_empty() {
            self.error(
                ast,
                template,
                format!("Parameters out of bounds: {}", out_of_bounds.join(",")),
            );
        }
    }

    fn visit_arguments(&mut self, ast: &Ast, args: Option<NodeId>) {
        if let Some(args) = args {
            ast.visit(args, self);
        }
    }

    fn check_condition(&mut self, ast: &Ast, condition: NodeId) {
        let types = self.eval(ast, condition);
        if !types.is_empty() && !types.contains(&Type::Bool) && !types.contains(&Type::Any) {
            self.warning(ast, condition, "Condition is not bool");
        }
    }

    fn check_snake_case(&mut self, ast: &Ast, id: NodeId, name: &str) {
        if self.config.check_snake_case && !SNAKE_CASE.is_match(name) {
            self.warning(ast, id, "Expected snake case");
        }
    }

    /// A resolved call whose only result is `void`. `install_*` functions are
    /// exempt.
    fn is_void_call(&self, ast: &Ast, rhs: NodeId, value: &TypeSet) -> bool {
        let is_call = match ast.kind(rhs) {
            NodeKind::FunctionExpression { .. } => ast
                .function_name(rhs)
                .is_some_and(|name| !name.starts_with("install_")),
            NodeKind::MethodExpression { .. } => true,
            _ => false,
        };
        is_call
            && self.types.contains_key(&rhs)
            && value.contains(&Type::Void)
            && value.without_void().is_empty()
    }

    /// Argument count, order and keyword checks against a signature.
    fn check_call(&mut self, ast: &Ast, call: NodeId, args: Option<NodeId>, function: &Function) {
        let raw_args = match args.map(|args| ast.kind(args)) {
            Some(NodeKind::ArgumentList { args }) => args.as_slice(),
            _ => &[],
        };

        let mut positional = 0;
        let mut keywords = vec![];
        for arg in raw_args {
            match ast.kind(*arg) {
                NodeKind::KeywordItem { key, .. } => {
                    keywords.push((*arg, ast.id_name(*key).unwrap_or_default()));
                }
                _ if !keywords.is_empty() => {
                    self.error(
                        ast,
                        *arg,
                        "Unexpected positional argument after a keyword argument",
                    );
                    positional += 1;
                }
                _ => positional += 1,
            }
        }

        if !function.is_checked() {
            return;
        }

        if positional < function.min_pos_args() {
            self.error(
                ast,
                call,
                format!(
                    "Expected at least {} positional arguments, but got {}!",
                    function.min_pos_args(),
                    positional
                ),
            );
        }
        if let Some(max) = function.max_pos_args() {
            if positional > max {
                self.error(
                    ast,
                    call,
                    format!(
                        "Expected at most {} positional arguments, but got {}!",
                        max, positional
                    ),
                );
            }
        }

        let spread = keywords.iter().any(|(_, name)| *name == "kwargs");
        for (item, name) in &keywords {
            if *name != "kwargs" && !function.has_kwarg(name) {
                self.error(ast, *item, format!("Unknown key word argument '{}'!", name));
            }
        }
        if !spread {
            for required in function.required_kwargs() {
                if !keywords.iter().any(|(_, name)| *name == required.as_str()) {
                    self.error(
                        ast,
                        call,
                        format!("Missing required key word argument '{}'!", required),
                    );
                }
            }
        }
    }

    /// Applies `op` to every combination of operand types.
    fn apply_operator(
        &mut self,
        ast: &Ast,
        at: NodeId,
        op: BinaryOperator,
        lhs: &TypeSet,
        rhs: &TypeSet,
    ) -> TypeSet {
        let (lhs, rhs) = (lhs.without_void(), rhs.without_void());
        if lhs.is_empty() || rhs.is_empty() {
            return TypeSet::new();
        }

        let mut result = TypeSet::new();
        let mut applied = false;
        for l in lhs.iter() {
            for r in rhs.iter() {
                if let Some(types) = operator_result(op, l, r) {
                    result.union(&types);
                    applied = true;
                }
            }
        }

        if !applied {
            self.warning(
                ast,
                at,
                format!(
                    "Unable to apply operator `{}` to types `{}` and `{}`",
                    op, lhs, rhs
                ),
            );
        }
        result
    }

    fn derive(
        &self,
        ast: &Ast,
        call: NodeId,
        name: &str,
        function: &Function,
        receiver: Option<&TypeSet>,
    ) -> TypeSet {
        let context = CallContext {
            ast,
            call,
            function,
            options: self.options,
            ns: self.ns,
            receiver,
            types: &self.types,
        };
        self.derivations.derive(name, &context)
    }

    fn literal_argument<'b>(&self, ast: &'b Ast, call: NodeId, idx: usize) -> Option<&'b str> {
        ast.positional_argument(call, idx)
            .and_then(|arg| ast.string_value(arg))
    }

    fn argument_types(&self, ast: &Ast, call: NodeId, idx: usize) -> TypeSet {
        ast.positional_argument(call, idx)
            .and_then(|arg| self.types.get(&arg).cloned())
            .unwrap_or_default()
    }

    /// `get_variable('name'[, fallback])`
    fn variable_lookup(&self, ast: &Ast, call: NodeId, function: &Function) -> TypeSet {
        let fallback = self.argument_types(ast, call, 1);
        match self
            .literal_argument(ast, call, 0)
            .and_then(|name| self.scope.get(name))
        {
            Some(types) => types.merged(&fallback),
            None if !fallback.is_empty() => fallback,
            None => function.return_types.clone(),
        }
    }

    fn resolve_subproject(&mut self, ast: &Ast, call: NodeId) {
        let Some(name) = self.literal_argument(ast, call, 0) else {
            return;
        };
        if self.subproject_scopes.contains_key(name) || self.check_cancelled(ast, call) {
            return;
        }

        match self.resolver.subproject(name) {
            SubprojectOutcome::Found(scope) => {
                trace!("subproject {} provides {} identifiers", name, scope.len());
                self.subproject_scopes.insert(name.to_string(), scope);
            }
            SubprojectOutcome::NotFound => {
                self.error(ast, call, format!("Subproject `{}` not found", name));
            }
            SubprojectOutcome::Disabled => {}
            SubprojectOutcome::Cancelled => self.cancelled = true,
        }
    }

    /// `sub.get_variable('name')` on a variable known to hold `subproject('x')`.
    fn subproject_variable(
        &self,
        ast: &Ast,
        call: NodeId,
        obj: NodeId,
        method: &Method,
    ) -> TypeSet {
        let known = ast
            .id_name(obj)
            .and_then(|var| self.subproject_vars.get(var))
            .and_then(|name| self.subproject_scopes.get(name))
            .zip(self.literal_argument(ast, call, 0))
            .and_then(|(scope, variable)| scope.get(variable));

        match known {
            Some(types) => types.merged(&self.argument_types(ast, call, 1)),
            None => self.derive(ast, call, &method.id(), &method.function, None),
        }
    }

    fn find_methods(&self, receiver: &TypeSet, name: &str) -> Vec<Arc<Method>> {
        let mut found: Vec<Arc<Method>> = vec![];
        for ty in receiver.iter() {
            let candidates = match ty {
                Type::Any => self.ns.guess_methods(name).to_vec(),
                Type::Void => vec![],
                other => match self.ns.resolve_method(other, name) {
                    Ok(method) => method.into_iter().collect(),
                    Err(error) => {
                        warn!("method lookup on `{}`: {}", other, error);
                        vec![]
                    }
                },
            };
            for method in candidates {
                if !found.iter().any(|f| f.id() == method.id()) {
                    found.push(method);
                }
            }
        }
        found
    }

    /// Types bound to each loop identifier.
    fn loop_bindings(
        &mut self,
        ast: &Ast,
        stmt: NodeId,
        expression: NodeId,
        iterated: &TypeSet,
        count: usize,
    ) -> Vec<TypeSet> {
        if iterated.is_unknown() {
            return vec![TYPES![Type::Any]; count];
        }

        let is_range = iterated.contains(&Type::object("range"));
        let mut elements = iterated.list_elements().cloned().unwrap_or_default();
        if is_range {
            elements.insert(Type::Int);
        }
        let is_list = is_range || iterated.list_elements().is_some();
        let dict_values = iterated.dict_values();

        match (count, dict_values) {
            (1, _) if is_list => vec![elements],
            (2, Some(values)) => vec![TYPES![Type::Str], values.clone()],
            (_, Some(_)) if !is_list => {
                self.error(ast, stmt, "Iterating over a dict requires two identifiers");
                vec![TypeSet::new(); count]
            }
            _ if is_list => {
                self.error(ast, stmt, "Iterating over a list/range requires one identifier");
                vec![TypeSet::new(); count]
            }
            _ => {
                self.error(ast, expression, "Expression yields no iterable result");
                vec![TypeSet::new(); count]
            }
        }
    }

    fn include(&mut self, ast: &Ast, call: NodeId, dir: &str, report_missing: bool) {
        if self.check_cancelled(ast, call) {
            return;
        }

        match self.resolver.include(ast.file(), dir, &self.scope) {
            IncludeOutcome::Analyzed(included) => {
                self.scope.union(&included.scope);
                for name in &included.reads {
                    self.mark_read(name);
                }
                for pending in included.unused {
                    self.add_pending(&pending.file, pending.location, &pending.name);
                }
            }
            IncludeOutcome::Cyclic => self.error(ast, call, "Cyclic subdir call"),
            IncludeOutcome::Missing(path) if report_missing => {
                self.error(ast, call, format!("Unable to find `{}`", path.display()))
            }
            IncludeOutcome::Missing(_) | IncludeOutcome::Skipped => {}
            IncludeOutcome::Cancelled => self.cancelled = true,
        }
    }
}

/// Result of a binary operator on one pair of operand types, `None` if the
/// combination is not defined.
fn operator_result(op: BinaryOperator, lhs: &Type, rhs: &Type) -> Option<TypeSet> {
    use BinaryOperator::*;

    let relational = matches!(op, Greater | Less | GreaterEquals | LessEquals);
    let arithmetic = matches!(op, Plus | Minus | Mul | Div | Modulo);
    let either_any = *lhs == Type::Any || *rhs == Type::Any;

    let types = match (op, lhs, rhs) {
        (Equals | NotEquals, _, _) => TYPES![Type::Bool],
        (And | Or, Type::Bool | Type::Any, Type::Bool | Type::Any) => TYPES![Type::Bool],
        (In | NotIn, _, Type::List(_) | Type::Dict(_) | Type::Str | Type::Any) => {
            TYPES![Type::Bool]
        }
        (_, Type::Int, Type::Int) | (_, Type::Str, Type::Str) if relational => TYPES![Type::Bool],
        _ if relational && either_any => TYPES![Type::Bool],
        (_, Type::Int, Type::Int) if arithmetic => TYPES![Type::Int],
        (Plus | Div, Type::Str, Type::Str) => TYPES![Type::Str],
        (Plus, Type::List(a), Type::List(b)) => TYPES![Type::list(a.merged(b))],
        (Plus, Type::List(a), other) => {
            let mut elements = a.clone();
            elements.insert(other.clone());
            TYPES![Type::list(elements)]
        }
        (Plus, Type::Dict(a), Type::Dict(b)) => TYPES![Type::dict(a.merged(b))],
        _ if arithmetic && either_any => TYPES![Type::Any],
        _ => return None,
    };
    Some(types)
}

/// Adds `value` to the element types of every container in `current`.
fn widen_elements(current: &TypeSet, value: &TypeSet) -> TypeSet {
    current
        .iter()
        .map(|ty| match ty {
            Type::List(elements) => Type::list(elements.merged(value)),
            Type::Dict(values) => Type::dict(values.merged(value)),
            other => other.clone(),
        })
        .collect()
}

impl CodeVisitor for TypeAnalyzer<'_> {
    fn visit_source_file(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_build_definition(&mut self, ast: &Ast, id: NodeId) {
        if let NodeKind::BuildDefinition { stmts } = ast.kind(id) {
            self.visit_block(ast, stmts);
            self.check_dead_code(ast, stmts);
        }
    }

    fn visit_error_node(&mut self, ast: &Ast, id: NodeId) {
        if let NodeKind::ErrorNode { message } = ast.kind(id) {
            self.error(ast, id, message.clone());
        }
    }

    fn visit_assignment_statement(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::AssignmentStatement { lhs, op, rhs } = ast.kind(id) else {
            return;
        };
        let (lhs, op, rhs) = (*lhs, *op, *rhs);
        let value = self.eval(ast, rhs);

        match ast.kind(lhs) {
            NodeKind::IdExpression { id: name } => {
                let types = if op == AssignmentOperator::Equals {
                    self.check_snake_case(ast, lhs, name);
                    if self.is_void_call(ast, rhs, &value) {
                        self.error(ast, lhs, "Can't assign from void");
                        return;
                    }
                    if ast.function_name(rhs) != Some("declare_dependency") {
                        self.add_pending(ast.file(), ast.location(lhs), name);
                    }
                    match ast.kind(rhs) {
                        NodeKind::FunctionExpression { .. }
                            if ast.function_name(rhs) == Some("subproject") =>
                        {
                            match self.literal_argument(ast, rhs, 0) {
                                Some(sub) => {
                                    self.subproject_vars.insert(name.clone(), sub.to_string())
                                }
                                None => self.subproject_vars.remove(name),
                            };
                        }
                        _ => {
                            self.subproject_vars.remove(name);
                        }
                    }
                    value
                } else {
                    self.mark_read(name);
                    match self.scope.get(name).cloned() {
                        Some(current) => {
                            let binary = op.binary().unwrap_or(BinaryOperator::Plus);
                            let types = self.apply_operator(ast, id, binary, &current, &value);
                            if types.is_empty() {
                                current
                            } else {
                                types
                            }
                        }
                        None => {
                            self.warning(ast, lhs, format!("Unknown identifier `{}`", name));
                            value
                        }
                    }
                };
                self.scope.set(name, types.clone());
                self.record(lhs, types);
            }
            NodeKind::SubscriptExpression { outer, inner } => {
                let Some(name) = ast.id_name(*outer) else {
                    self.error(ast, lhs, "Can only assign to variables");
                    return;
                };
                self.eval(ast, *inner);
                let Some(current) = self.scope.get(name).cloned() else {
                    self.warning(ast, *outer, format!("Unknown identifier `{}`", name));
                    return;
                };
                self.mark_read(name);
                let widened = widen_elements(&current, &value);
                self.scope.set(name, widened.clone());
                self.record(*outer, widened);
            }
            _ => self.error(ast, lhs, "Can only assign to variables"),
        }
    }

    fn visit_selection_statement(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::SelectionStatement { conditions, blocks } = ast.kind(id) else {
            return;
        };

        let entry = self.scope.clone();
        let first_pending = self.next_pending;
        let mut exits = Vec::with_capacity(blocks.len() + 1);
        for (idx, block) in blocks.iter().enumerate() {
            self.scope = entry.clone();
            if let Some(condition) = conditions.get(idx) {
                self.check_condition(ast, *condition);
            }
            self.visit_block(ast, block);
            exits.push(std::mem::take(&mut self.scope));
        }
        if blocks.len() == conditions.len() {
            exits.push(entry);
        }
        self.scope = Scope::merge_all(&exits);

        let mut assigned = HashSet::new();
        self.pending
            .retain(|pending| pending.seq < first_pending || assigned.insert(pending.name.clone()));
    }

    fn visit_iteration_statement(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::IterationStatement {
            ids,
            expression,
            block,
        } = ast.kind(id)
        else {
            return;
        };

        let iterated = self.eval(ast, *expression);
        let bindings = self.loop_bindings(ast, id, *expression, &iterated, ids.len());
        if self.check_cancelled(ast, id) {
            return;
        }

        let entry = self.scope.clone();
        let (first_pending, first_read) = (self.next_pending, self.read_log.len());
        self.loop_depth += 1;
        for (node, types) in ids.iter().zip(bindings) {
            if let Some(name) = ast.id_name(*node) {
                self.check_snake_case(ast, *node, name);
                self.scope.set(name, types.clone());
            }
            self.record(*node, types);
        }
        self.visit_block(ast, block);
        self.loop_depth -= 1;

        // An assignment at the end of the body may be read by the next iteration.
        let body_reads = self.read_log.split_off(first_read);
        self.pending.retain(|pending| {
            pending.seq < first_pending || !body_reads.contains(&pending.name)
        });
        if self.loop_depth > 0 {
            self.read_log.extend(body_reads);
        }

        let exit = std::mem::replace(&mut self.scope, entry);
        self.scope.union(&exit);
    }

    // Loops are analyzed in a single pass, so jumps do not narrow anything.
    fn visit_break_statement(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_continue_statement(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_binary_expression(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::BinaryExpression { lhs, op, rhs } = ast.kind(id) else {
            return;
        };
        let left = self.eval(ast, *lhs);
        let right = self.eval(ast, *rhs);
        let types = self.apply_operator(ast, id, *op, &left, &right);
        self.record(id, types);
    }

    fn visit_unary_expression(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::UnaryExpression { op, expression } = ast.kind(id) else {
            return;
        };
        self.eval(ast, *expression);
        let types = match op {
            UnaryOperator::Not | UnaryOperator::ExclamationMark => TYPES![Type::Bool],
            UnaryOperator::Minus => TYPES![Type::Int],
        };
        self.record(id, types);
    }

    fn visit_conditional_expression(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::ConditionalExpression {
            condition,
            if_true,
            if_false,
        } = ast.kind(id)
        else {
            return;
        };
        self.check_condition(ast, *condition);
        let types = self.eval(ast, *if_true).merged(&self.eval(ast, *if_false));
        self.record(id, types);
    }

    fn visit_subscript_expression(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::SubscriptExpression { outer, inner } = ast.kind(id) else {
            return;
        };
        let container = self.eval(ast, *outer);
        self.eval(ast, *inner);

        let mut types = TypeSet::new();
        for ty in container.iter() {
            match ty {
                Type::List(elements) => types.union(elements),
                Type::Dict(values) => types.union(values),
                Type::Str => types.insert(Type::Str),
                Type::Object(name) if name == "custom_tgt" => {
                    types.insert(Type::object("custom_idx"))
                }
                Type::Any => types.insert(Type::Any),
                _ => {}
            }
        }
        self.record(id, types);
    }

    fn visit_function_expression(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::FunctionExpression { id: callee, args } = ast.kind(id) else {
            return;
        };
        self.visit_arguments(ast, *args);
        let Some(name) = ast.id_name(*callee) else {
            return;
        };
        let Some(function) = self.ns.lookup_function(name).cloned() else {
            self.error(ast, *callee, format!("Unknown function `{}`", name));
            return;
        };
        self.check_call(ast, id, *args, &function);

        let types = match name {
            "get_variable" => {
                if let Some(variable) = self.literal_argument(ast, id, 0) {
                    self.mark_read(variable);
                }
                self.variable_lookup(ast, id, &function)
            }
            "set_variable" => {
                if let Some(variable) = self.literal_argument(ast, id, 0) {
                    let value = self.argument_types(ast, id, 1);
                    self.scope.set(variable, value);
                }
                function.return_types.clone()
            }
            "unset_variable" => {
                if let Some(variable) = self.literal_argument(ast, id, 0) {
                    self.scope.remove(variable);
                }
                function.return_types.clone()
            }
            "subproject" => {
                self.resolve_subproject(ast, id);
                self.derive(ast, id, name, &function, None)
            }
            _ => self.derive(ast, id, name, &function, None),
        };
        self.record(id, types);
    }

    fn visit_method_expression(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::MethodExpression {
            obj,
            id: method_id,
            args,
        } = ast.kind(id)
        else {
            return;
        };
        let receiver = self.eval(ast, *obj);
        self.visit_arguments(ast, *args);
        let Some(name) = ast.id_name(*method_id) else {
            return;
        };
        if receiver.is_empty() {
            return;
        }

        let methods = self.find_methods(&receiver, name);
        if methods.is_empty() {
            self.error(
                ast,
                *method_id,
                format!("No method `{}` found for types `{}`", name, receiver),
            );
            return;
        }
        if let [method] = methods.as_slice() {
            self.check_call(ast, id, *args, &method.function);
            if method.id() == "str.format"
                && matches!(ast.kind(*obj), NodeKind::StringLiteral { .. })
            {
                self.check_format(ast, id, *obj, *args);
            }
        }
        if methods
            .iter()
            .all(|method| PURE_METHODS.contains(&method.id().as_str()))
        {
            self.pure_calls.insert(id);
        }

        let mut types = TypeSet::new();
        for method in &methods {
            let derived = if method.id() == "subproject.get_variable" {
                self.subproject_variable(ast, id, *obj, method)
            } else {
                self.derive(ast, id, &method.id(), &method.function, Some(&receiver))
            };
            types.union(&derived);
        }
        self.record(id, types);
    }

    fn visit_subdir_call(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::SubdirCall { args, dir, .. } = ast.kind(id) else {
            return;
        };
        self.visit_arguments(ast, *args);
        self.include(ast, id, dir, true);
        self.record(id, TYPES![Type::Void]);
    }

    fn visit_multi_subdir_call(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::MultiSubdirCall { args, dirs, .. } = ast.kind(id) else {
            return;
        };
        self.visit_arguments(ast, *args);
        for dir in dirs {
            if self.cancelled {
                break;
            }
            self.include(ast, id, dir, false);
        }
        self.record(id, TYPES![Type::Void]);
    }

    fn visit_argument_list(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_keyword_item(&mut self, ast: &Ast, id: NodeId) {
        if let NodeKind::KeywordItem { value, .. } = ast.kind(id) {
            let types = self.eval(ast, *value);
            self.record(id, types);
        }
    }

    fn visit_key_value_item(&mut self, ast: &Ast, id: NodeId) {
        if let NodeKind::KeyValueItem { key, value } = ast.kind(id) {
            self.eval(ast, *key);
            let types = self.eval(ast, *value);
            self.record(id, types);
        }
    }

    fn visit_array_literal(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::ArrayLiteral { args } = ast.kind(id) else {
            return;
        };
        let mut elements = TypeSet::new();
        for arg in args {
            elements.union(&self.eval(ast, *arg));
        }
        self.record(id, TYPES![Type::list(elements)]);
    }

    fn visit_dictionary_literal(&mut self, ast: &Ast, id: NodeId) {
        let NodeKind::DictionaryLiteral { values } = ast.kind(id) else {
            return;
        };
        let mut value_types = TypeSet::new();
        for item in values {
            value_types.union(&self.eval(ast, *item));
        }
        self.record(id, TYPES![Type::dict(value_types)]);
    }

    fn visit_id_expression(&mut self, ast: &Ast, id: NodeId) {
        let Some(name) = ast.id_name(id) else {
            return;
        };
        match self.scope.get(name).cloned() {
            Some(types) => {
                self.mark_read(name);
                self.record(id, types);
            }
            None => self.warning(ast, id, format!("Unknown identifier `{}`", name)),
        }
    }

    fn visit_boolean_literal(&mut self, _ast: &Ast, id: NodeId) {
        self.record(id, TYPES![Type::Bool]);
    }

    fn visit_integer_literal(&mut self, _ast: &Ast, id: NodeId) {
        self.record(id, TYPES![Type::Int]);
    }

    fn visit_string_literal(&mut self, ast: &Ast, id: NodeId) {
        if let NodeKind::StringLiteral {
            value,
            is_format: true,
        } = ast.kind(id)
        {
            for captures in FORMAT_VARIABLE.captures_iter(value) {
                self.mark_read(&captures[1]);
            }
        }
        self.record(id, TYPES![Type::Str]);
    }
}

/// Analyzes one file on its own, without following includes.
pub fn analyze_ast(ast: &Ast, ns: &TypeNamespace, options: &Options) -> AnalysisResult {
    let config = AnalysisOptions::default();
    let mut resolver = NoIncludes;
    TypeAnalyzer::new(
        ns,
        derivations(),
        options,
        &config,
        &mut resolver,
        CancellationToken::new(),
    )
    .run(ast)
}
