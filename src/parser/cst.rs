//! Concrete syntax tree handed from the grammar front-end to the AST builder.
//!
//! Node kinds and field names follow the external meson grammar, so the
//! AST's `from_tree` constructors read children the same way regardless of
//! which front-end produced the tree.

use std::fmt::Display;

use crate::Location;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SyntaxKind {
    SourceFile,
    BuildDefinition,
    AssignmentStatement,
    SelectionStatement,
    IterationStatement,
    JumpStatement,
    Block,
    Keyword,
    FunctionExpression,
    MethodExpression,
    ArgumentList,
    KeywordItem,
    ConditionalExpression,
    UnaryExpression,
    SubscriptExpression,
    BinaryExpression,
    StringLiteral,
    IntegerLiteral,
    BooleanLiteral,
    IdExpression,
    ArrayLiteral,
    DictionaryLiteral,
    KeyValueItem,
    Error,
}

impl SyntaxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxKind::SourceFile => "source_file",
            SyntaxKind::BuildDefinition => "build_definition",
            SyntaxKind::AssignmentStatement => "assignment_statement",
            SyntaxKind::SelectionStatement => "selection_statement",
            SyntaxKind::IterationStatement => "iteration_statement",
            SyntaxKind::JumpStatement => "jump_statement",
            SyntaxKind::Block => "block",
            SyntaxKind::Keyword => "keyword",
            SyntaxKind::FunctionExpression => "function_expression",
            SyntaxKind::MethodExpression => "method_expression",
            SyntaxKind::ArgumentList => "argument_list",
            SyntaxKind::KeywordItem => "keyword_item",
            SyntaxKind::ConditionalExpression => "conditional_expression",
            SyntaxKind::UnaryExpression => "unary_expression",
            SyntaxKind::SubscriptExpression => "subscript_expression",
            SyntaxKind::BinaryExpression => "binary_expression",
            SyntaxKind::StringLiteral => "string_literal",
            SyntaxKind::IntegerLiteral => "integer_literal",
            SyntaxKind::BooleanLiteral => "boolean_literal",
            SyntaxKind::IdExpression => "id_expression",
            SyntaxKind::ArrayLiteral => "array_literal",
            SyntaxKind::DictionaryLiteral => "dictionary_literal",
            SyntaxKind::KeyValueItem => "key_value_item",
            SyntaxKind::Error => "ERROR",
        }
    }
}

impl Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One node of the concrete syntax tree.
///
/// `text` holds the identifier name, decoded literal contents, operator,
/// keyword, or error message, depending on `kind`. Named fields index into
/// `children`; a field may occur more than once (e.g. two loop identifiers).
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub location: Location,
    pub text: String,
    pub children: Vec<SyntaxNode>,
    fields: Vec<(&'static str, usize)>,
    /// Set on string literals written with an `f` prefix.
    pub is_format: bool,
}

impl SyntaxNode {
    pub fn leaf(kind: SyntaxKind, location: Location, text: impl Into<String>) -> Self {
        SyntaxNode {
            kind,
            location,
            text: text.into(),
            children: vec![],
            fields: vec![],
            is_format: false,
        }
    }

    pub fn branch(kind: SyntaxKind, location: Location) -> Self {
        SyntaxNode::leaf(kind, location, String::new())
    }

    pub fn error(location: Location, message: impl Into<String>) -> Self {
        SyntaxNode::leaf(SyntaxKind::Error, location, message)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_field(mut self, name: &'static str, child: SyntaxNode) -> Self {
        self.fields.push((name, self.children.len()));
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: SyntaxNode) {
        self.children.push(child);
    }

    pub fn child_by_field_name<'a>(&'a self, name: &'a str) -> Option<&'a SyntaxNode> {
        self.children_by_field_name(name).next()
    }

    pub fn children_by_field_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.fields
            .iter()
            .filter(move |(field, _)| *field == name)
            .filter_map(|(_, idx)| self.children.get(*idx))
    }

    /// Children that are not keywords.
    pub fn named_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children
            .iter()
            .filter(|child| child.kind != SyntaxKind::Keyword)
    }

    /// Renders the tree as an s-expression, used by tests and `--dump-cst`.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind.as_str());
        if self.children.is_empty() && !self.text.is_empty() {
            out.push_str(&format!(" {:?}", self.text));
        }
        for (idx, child) in self.children.iter().enumerate() {
            out.push(' ');
            if let Some((field, _)) = self.fields.iter().find(|(_, i)| *i == idx) {
                out.push_str(field);
                out.push_str(": ");
            }
            child.write_sexp(out);
        }
        out.push(')');
    }
}
