//! Per-callee return type rules.
//!
//! A call whose result depends on its arguments is looked up here by its
//! qualified name (`import`, `dict.get`, ...). Calls without a rule yield
//! the callee's declared return types.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    ast::ast::{Ast, NodeId},
    types::{
        builtins::{build_target_types, option_types},
        function::Function,
        modules::module_type_name,
        namespace::TypeNamespace,
        types::{Type, TypeSet},
    },
    TYPES,
};

use super::options::Options;

/// Everything a rule may look at.
pub struct CallContext<'a> {
    pub ast: &'a Ast,
    pub call: NodeId,
    pub function: &'a Function,
    pub options: &'a Options,
    pub ns: &'a TypeNamespace,
    /// Types of the receiver, for method calls.
    pub receiver: Option<&'a TypeSet>,
    /// Types already inferred for the call's argument nodes.
    pub types: &'a HashMap<NodeId, TypeSet>,
}

impl CallContext<'_> {
    pub fn types_of(&self, id: NodeId) -> TypeSet {
        self.types.get(&id).cloned().unwrap_or_default()
    }

    pub fn literal_argument(&self, idx: usize) -> Option<&str> {
        self.ast
            .positional_argument(self.call, idx)
            .and_then(|arg| self.ast.string_value(arg))
    }

    pub fn argument_types(&self, idx: usize) -> TypeSet {
        self.ast
            .positional_argument(self.call, idx)
            .map(|arg| self.types_of(arg))
            .unwrap_or_default()
    }
}

pub type DerivationRule = fn(&CallContext) -> TypeSet;

lazy_static! {
    static ref DERIVATIONS: TypeDerivations = TypeDerivations::builtin();
}

/// The shared table of built-in rules.
pub fn derivations() -> &'static TypeDerivations {
    &DERIVATIONS
}

pub struct TypeDerivations {
    rules: HashMap<&'static str, DerivationRule>,
}

impl TypeDerivations {
    pub fn empty() -> Self {
        TypeDerivations {
            rules: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut derivations = TypeDerivations::empty();
        derivations.register("import", derive_import);
        derivations.register("get_option", derive_get_option);
        derivations.register("build_target", derive_build_target);
        derivations.register("dict.get", derive_dict_get);
        derivations.register("list.get", derive_list_get);
        derivations.register("subproject.get_variable", derive_subproject_get_variable);
        derivations
    }

    pub fn register(&mut self, name: &'static str, rule: DerivationRule) {
        self.rules.insert(name, rule);
    }

    pub fn get(&self, name: &str) -> Option<DerivationRule> {
        self.rules.get(name).copied()
    }

    /// Result types of a call to the callee known as `name`.
    pub fn derive(&self, name: &str, context: &CallContext) -> TypeSet {
        let types = match self.get(name) {
            Some(rule) => rule(context),
            None => context.function.return_types.clone(),
        };
        context.ns.resolve_all(&types)
    }
}

fn derive_import(context: &CallContext) -> TypeSet {
    context
        .literal_argument(0)
        .and_then(module_type_name)
        .filter(|name| context.ns.lookup_object(name).is_some())
        .map(|name| TYPES![Type::object(name)])
        .unwrap_or_else(|| context.function.return_types.clone())
}

fn derive_get_option(context: &CallContext) -> TypeSet {
    context
        .literal_argument(0)
        .and_then(|name| context.options.get(name))
        .map(|option| option.kind.types())
        .unwrap_or_else(option_types)
}

fn derive_build_target(context: &CallContext) -> TypeSet {
    let target_type = context
        .ast
        .keyword_argument(context.call, "target_type")
        .and_then(|arg| context.ast.string_value(arg));

    let name = match target_type {
        Some("executable") => "exe",
        Some("shared_library") | Some("static_library") | Some("library") => "lib",
        Some("shared_module") => "build_tgt",
        Some("both_libraries") => "both_libs",
        Some("jar") => "jar",
        _ => return build_target_types(),
    };
    TYPES![Type::object(name)]
}

fn derive_dict_get(context: &CallContext) -> TypeSet {
    let mut types = context
        .receiver
        .and_then(|receiver| receiver.dict_values())
        .cloned()
        .unwrap_or_default();
    types.union(&context.argument_types(1));
    types
}

fn derive_list_get(context: &CallContext) -> TypeSet {
    let mut types = context
        .receiver
        .and_then(|receiver| receiver.list_elements())
        .cloned()
        .unwrap_or_default();
    types.union(&context.argument_types(1));
    types
}

fn derive_subproject_get_variable(context: &CallContext) -> TypeSet {
    context
        .function
        .return_types
        .merged(&context.argument_types(1))
}
