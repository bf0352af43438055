use super::ast::{Ast, NodeId, NodeKind};

/// Visitor over an `Ast`.
///
/// `Ast::visit` dispatches each node to exactly one method, and every node
/// kind has its own method with no default body. Implementors that only care
/// about a few kinds call `Ast::visit_children` from the rest. Callbacks
/// receive the arena by shared reference and may start nested traversals of
/// their own.
pub trait CodeVisitor {
    fn visit_source_file(&mut self, ast: &Ast, id: NodeId);
    fn visit_build_definition(&mut self, ast: &Ast, id: NodeId);
    fn visit_error_node(&mut self, ast: &Ast, id: NodeId);
    fn visit_assignment_statement(&mut self, ast: &Ast, id: NodeId);
    fn visit_selection_statement(&mut self, ast: &Ast, id: NodeId);
    fn visit_iteration_statement(&mut self, ast: &Ast, id: NodeId);
    fn visit_break_statement(&mut self, ast: &Ast, id: NodeId);
    fn visit_continue_statement(&mut self, ast: &Ast, id: NodeId);
    fn visit_binary_expression(&mut self, ast: &Ast, id: NodeId);
    fn visit_unary_expression(&mut self, ast: &Ast, id: NodeId);
    fn visit_conditional_expression(&mut self, ast: &Ast, id: NodeId);
    fn visit_subscript_expression(&mut self, ast: &Ast, id: NodeId);
    fn visit_function_expression(&mut self, ast: &Ast, id: NodeId);
    fn visit_method_expression(&mut self, ast: &Ast, id: NodeId);
    fn visit_subdir_call(&mut self, ast: &Ast, id: NodeId);
    fn visit_multi_subdir_call(&mut self, ast: &Ast, id: NodeId);
    fn visit_argument_list(&mut self, ast: &Ast, id: NodeId);
    fn visit_keyword_item(&mut self, ast: &Ast, id: NodeId);
    fn visit_key_value_item(&mut self, ast: &Ast, id: NodeId);
    fn visit_array_literal(&mut self, ast: &Ast, id: NodeId);
    fn visit_dictionary_literal(&mut self, ast: &Ast, id: NodeId);
    fn visit_id_expression(&mut self, ast: &Ast, id: NodeId);
    fn visit_boolean_literal(&mut self, ast: &Ast, id: NodeId);
    fn visit_integer_literal(&mut self, ast: &Ast, id: NodeId);
    fn visit_string_literal(&mut self, ast: &Ast, id: NodeId);
}

impl Ast {
    pub fn visit<V: CodeVisitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        match self.kind(id) {
            NodeKind::SourceFile { .. } => visitor.visit_source_file(self, id),
            NodeKind::BuildDefinition { .. } => visitor.visit_build_definition(self, id),
            NodeKind::ErrorNode { .. } => visitor.visit_error_node(self, id),
            NodeKind::AssignmentStatement { .. } => visitor.visit_assignment_statement(self, id),
            NodeKind::SelectionStatement { .. } => visitor.visit_selection_statement(self, id),
            NodeKind::IterationStatement { .. } => visitor.visit_iteration_statement(self, id),
            NodeKind::BreakStatement => visitor.visit_break_statement(self, id),
            NodeKind::ContinueStatement => visitor.visit_continue_statement(self, id),
            NodeKind::BinaryExpression { .. } => visitor.visit_binary_expression(self, id),
            NodeKind::UnaryExpression { .. } => visitor.visit_unary_expression(self, id),
            NodeKind::ConditionalExpression { .. } => {
                visitor.visit_conditional_expression(self, id)
            }
            NodeKind::SubscriptExpression { .. } => visitor.visit_subscript_expression(self, id),
            NodeKind::FunctionExpression { .. } => visitor.visit_function_expression(self, id),
            NodeKind::MethodExpression { .. } => visitor.visit_method_expression(self, id),
            NodeKind::SubdirCall { .. } => visitor.visit_subdir_call(self, id),
            NodeKind::MultiSubdirCall { .. } => visitor.visit_multi_subdir_call(self, id),
            NodeKind::ArgumentList { .. } => visitor.visit_argument_list(self, id),
            NodeKind::KeywordItem { .. } => visitor.visit_keyword_item(self, id),
            NodeKind::KeyValueItem { .. } => visitor.visit_key_value_item(self, id),
            NodeKind::ArrayLiteral { .. } => visitor.visit_array_literal(self, id),
            NodeKind::DictionaryLiteral { .. } => visitor.visit_dictionary_literal(self, id),
            NodeKind::IdExpression { .. } => visitor.visit_id_expression(self, id),
            NodeKind::BooleanLiteral { .. } => visitor.visit_boolean_literal(self, id),
            NodeKind::IntegerLiteral { .. } => visitor.visit_integer_literal(self, id),
            NodeKind::StringLiteral { .. } => visitor.visit_string_literal(self, id),
        }
    }

    /// Visits every child of `id` left to right.
    pub fn visit_children<V: CodeVisitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        for child in self.children(id) {
            self.visit(child, visitor);
        }
    }
}
