//! Build options declared in `meson.options` / `meson_options.txt`.

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind, UnaryOperator},
        visitor::CodeVisitor,
    },
    types::types::{Type, TypeSet},
    TYPES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    Feature,
    Combo,
    Array,
}

impl OptionKind {
    pub fn from_str(kind: &str) -> Option<Self> {
        match kind {
            "string" => Some(OptionKind::String),
            "integer" => Some(OptionKind::Integer),
            "boolean" => Some(OptionKind::Boolean),
            "feature" => Some(OptionKind::Feature),
            "combo" => Some(OptionKind::Combo),
            "array" => Some(OptionKind::Array),
            _ => None,
        }
    }

    /// Types `get_option` yields for an option of this kind.
    pub fn types(&self) -> TypeSet {
        match self {
            OptionKind::String | OptionKind::Combo => TYPES![Type::Str],
            OptionKind::Integer => TYPES![Type::Int],
            OptionKind::Boolean => TYPES![Type::Bool],
            OptionKind::Feature => TYPES![Type::object("feature")],
            OptionKind::Array => TYPES![Type::list(TYPES![Type::Bool, Type::Int, Type::Str])],
        }
    }
}

/// A literal default taken from an option declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Array(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MesonOption {
    pub name: String,
    pub kind: OptionKind,
    pub description: Option<String>,
    pub choices: Vec<String>,
    pub deprecated: bool,
    pub value: Option<OptionValue>,
}

impl MesonOption {
    /// The value the option has when the user does not set it.
    pub fn default_value(&self) -> OptionValue {
        if let Some(value) = &self.value {
            return value.clone();
        }
        match self.kind {
            OptionKind::String => OptionValue::Str(String::new()),
            OptionKind::Integer => OptionValue::Int(0),
            OptionKind::Boolean => OptionValue::Bool(true),
            OptionKind::Feature => OptionValue::Str(String::from("auto")),
            OptionKind::Combo => OptionValue::Str(self.choices.first().cloned().unwrap_or_default()),
            OptionKind::Array => OptionValue::Array(self.choices.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    options: IndexMap<String, MesonOption>,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    pub fn get(&self, name: &str) -> Option<&MesonOption> {
        self.options.get(name)
    }

    pub fn insert(&mut self, option: MesonOption) {
        self.options.insert(option.name.clone(), option);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MesonOption> {
        self.options.values()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Collects every `option(...)` call with a literal name and `type:`.
pub fn extract_options(ast: &Ast) -> Options {
    let mut extractor = OptionsExtractor {
        options: Options::new(),
    };
    ast.visit(ast.root(), &mut extractor);
    debug!(
        "extracted {} options from {:?}",
        extractor.options.len(),
        ast.file()
    );
    extractor.options
}

struct OptionsExtractor {
    options: Options,
}

fn literal_value(ast: &Ast, id: NodeId) -> Option<OptionValue> {
    match ast.kind(id) {
        NodeKind::BooleanLiteral { value } => Some(OptionValue::Bool(*value)),
        NodeKind::IntegerLiteral { value } => Some(OptionValue::Int(*value)),
        NodeKind::StringLiteral { value, .. } => Some(OptionValue::Str(value.clone())),
        NodeKind::ArrayLiteral { .. } => Some(OptionValue::Array(string_array(ast, id))),
        NodeKind::UnaryExpression {
            op: UnaryOperator::Minus,
            expression,
        } => match ast.kind(*expression) {
            NodeKind::IntegerLiteral { value } => Some(OptionValue::Int(-*value)),
            _ => None,
        },
        _ => None,
    }
}

fn string_array(ast: &Ast, id: NodeId) -> Vec<String> {
    match ast.kind(id) {
        NodeKind::ArrayLiteral { args } => args
            .iter()
            .filter_map(|arg| ast.string_value(*arg).map(str::to_string))
            .collect(),
        _ => vec![],
    }
}

impl CodeVisitor for OptionsExtractor {
    fn visit_source_file(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_build_definition(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_assignment_statement(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_selection_statement(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_iteration_statement(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_binary_expression(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_unary_expression(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_conditional_expression(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_subscript_expression(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_method_expression(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_subdir_call(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_multi_subdir_call(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_argument_list(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_keyword_item(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_key_value_item(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_array_literal(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_dictionary_literal(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
    }

    fn visit_error_node(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_break_statement(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_continue_statement(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_id_expression(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_boolean_literal(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_integer_literal(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_string_literal(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_function_expression(&mut self, ast: &Ast, id: NodeId) {
        ast.visit_children(id, self);
        if ast.function_name(id) != Some("option") {
            return;
        }

        let Some(name) = ast
            .positional_argument(id, 0)
            .and_then(|arg| ast.string_value(arg))
        else {
            return;
        };
        let Some(kind) = ast
            .keyword_argument(id, "type")
            .and_then(|arg| ast.string_value(arg))
            .and_then(OptionKind::from_str)
        else {
            return;
        };

        let description = ast
            .keyword_argument(id, "description")
            .and_then(|arg| ast.string_value(arg))
            .map(str::to_string);
        let deprecated = matches!(
            ast.keyword_argument(id, "deprecated").map(|arg| ast.kind(arg)),
            Some(NodeKind::BooleanLiteral { value: true })
        );
        let choices = ast
            .keyword_argument(id, "choices")
            .map(|arg| string_array(ast, arg))
            .unwrap_or_default();
        let value = ast
            .keyword_argument(id, "value")
            .and_then(|arg| literal_value(ast, arg));

        self.options.insert(MesonOption {
            name: name.to_string(),
            kind,
            description,
            choices,
            deprecated,
            value,
        });
    }
}
