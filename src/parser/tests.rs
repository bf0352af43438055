//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the build language including:
//! - Assignments and compound assignments
//! - Operator precedence
//! - Function and method calls with keyword arguments
//! - Selection and iteration statements
//! - Error recovery

use super::{
    cst::{SyntaxKind, SyntaxNode},
    parser::{parse, parse_source},
};
use crate::lexer::lexer::tokenize;

fn statements(source: &str) -> Vec<SyntaxNode> {
    let root = parse_source(source);
    assert_eq!(root.kind, SyntaxKind::SourceFile);
    root.children[0].children.clone()
}

fn single(source: &str) -> SyntaxNode {
    let mut stmts = statements(source);
    assert_eq!(stmts.len(), 1, "expected one statement in {:?}", source);
    stmts.remove(0)
}

#[test]
fn test_parse_assignment() {
    let stmt = single("x = 42");

    assert_eq!(
        stmt.to_sexp(),
        "(assignment_statement left: (id_expression \"x\") right: (integer_literal \"42\"))"
    );
    assert_eq!(stmt.text, "=");
}

#[test]
fn test_parse_compound_assignment() {
    let stmt = single("srcs += ['a.c']");

    assert_eq!(stmt.kind, SyntaxKind::AssignmentStatement);
    assert_eq!(stmt.text, "+=");
    assert_eq!(
        stmt.child_by_field_name("right").unwrap().kind,
        SyntaxKind::ArrayLiteral
    );
}

#[test]
fn test_operator_precedence() {
    let stmt = single("x = 1 + 2 * 3 == 7 and not false");
    let rhs = stmt.child_by_field_name("right").unwrap();

    assert_eq!(rhs.text, "and");
    let left = rhs.child_by_field_name("left").unwrap();
    assert_eq!(left.text, "==");
    let sum = left.child_by_field_name("left").unwrap();
    assert_eq!(sum.text, "+");
    assert_eq!(sum.child_by_field_name("right").unwrap().text, "*");
    assert_eq!(rhs.child_by_field_name("right").unwrap().kind, SyntaxKind::UnaryExpression);
}

#[test]
fn test_parse_not_in() {
    let stmt = single("y = 'a' not in ['b']");
    let rhs = stmt.child_by_field_name("right").unwrap();

    assert_eq!(rhs.kind, SyntaxKind::BinaryExpression);
    assert_eq!(rhs.text, "not in");
}

#[test]
fn test_parse_function_call() {
    let stmt = single("executable('app', 'main.c', install: true)");

    assert_eq!(stmt.kind, SyntaxKind::FunctionExpression);
    assert_eq!(stmt.child_by_field_name("function").unwrap().text, "executable");
    let args = stmt.child_by_field_name("arguments").unwrap();
    assert_eq!(args.children.len(), 3);
    assert_eq!(args.children[2].kind, SyntaxKind::KeywordItem);
    assert_eq!(args.children[2].child_by_field_name("key").unwrap().text, "install");
}

#[test]
fn test_call_without_arguments_has_no_argument_list() {
    let stmt = single("x = environment()");
    let call = stmt.child_by_field_name("right").unwrap();

    assert_eq!(call.kind, SyntaxKind::FunctionExpression);
    assert!(call.child_by_field_name("arguments").is_none());
}

#[test]
fn test_parse_method_chain_and_subscript() {
    let stmt = single("v = meson.get_compiler('c').get_id()[0]");
    let rhs = stmt.child_by_field_name("right").unwrap();

    assert_eq!(rhs.kind, SyntaxKind::SubscriptExpression);
    let method = rhs.child_by_field_name("object").unwrap();
    assert_eq!(method.kind, SyntaxKind::MethodExpression);
    assert_eq!(method.child_by_field_name("name").unwrap().text, "get_id");
    assert_eq!(
        method.child_by_field_name("object").unwrap().kind,
        SyntaxKind::MethodExpression
    );
}

#[test]
fn test_parse_multiline_arguments() {
    let stmt = single("lib = library(\n  'foo',\n  sources: files(\n    'a.c',\n  ),\n)\n");

    assert_eq!(stmt.kind, SyntaxKind::AssignmentStatement);
    assert_eq!(stmt.location.start_line, 0);
    assert_eq!(stmt.location.end_line, 5);
}

#[test]
fn test_parse_dict_and_ternary() {
    let stmt = single("d = cond ? {'a': 1, 'b': [2]} : {}");
    let rhs = stmt.child_by_field_name("right").unwrap();

    assert_eq!(rhs.kind, SyntaxKind::ConditionalExpression);
    let if_true = rhs.child_by_field_name("true").unwrap();
    assert_eq!(if_true.kind, SyntaxKind::DictionaryLiteral);
    assert_eq!(if_true.children.len(), 2);
    assert_eq!(if_true.children[0].kind, SyntaxKind::KeyValueItem);
    assert!(rhs.child_by_field_name("false").unwrap().children.is_empty());
}

#[test]
fn test_parse_if_elif_else() {
    let stmt = single("if a\n x = 1\nelif b\n x = 2\nelse\n x = 3\nendif\n");

    assert_eq!(stmt.kind, SyntaxKind::SelectionStatement);
    assert_eq!(stmt.children_by_field_name("condition").count(), 2);
    assert_eq!(stmt.children_by_field_name("block").count(), 3);
}

#[test]
fn test_parse_if_without_else() {
    let stmt = single("if a\n x = 1\nendif");

    assert_eq!(stmt.children_by_field_name("condition").count(), 1);
    assert_eq!(stmt.children_by_field_name("block").count(), 1);
}

#[test]
fn test_parse_foreach() {
    let stmt = single("foreach k, v : {'a': 1}\n  if v == 1\n    break\n  endif\n  continue\nendforeach");

    assert_eq!(stmt.kind, SyntaxKind::IterationStatement);
    assert_eq!(stmt.children_by_field_name("id").count(), 2);
    let block = stmt.child_by_field_name("block").unwrap();
    assert_eq!(block.children.len(), 2);
    assert_eq!(block.children[1].kind, SyntaxKind::JumpStatement);
    assert_eq!(block.children[1].text, "continue");
}

#[test]
fn test_error_recovery_keeps_following_statements() {
    let tokens = tokenize("x = (1 +\ny = 2\nz = )\nw = 3\n").unwrap();
    let (parser, root) = parse(tokens);
    let stmts = &root.children[0].children;

    assert_eq!(stmts.first().unwrap().kind, SyntaxKind::Error);
    assert_eq!(stmts.last().unwrap().kind, SyntaxKind::AssignmentStatement);
    assert_eq!(
        stmts.last().unwrap().child_by_field_name("left").unwrap().text,
        "w"
    );
    assert!(!parser.errors().is_empty());
}

#[test]
fn test_missing_endif_is_an_error_node() {
    let stmts = statements("if true\n x = 1\n");

    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].kind, SyntaxKind::Error);
}

#[test]
fn test_lexer_error_becomes_error_node() {
    let stmts = statements("x = $");

    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].kind, SyntaxKind::Error);
    assert!(stmts[0].text.contains("unrecognised token"));
}

#[test]
fn test_only_identifiers_are_callable() {
    let stmts = statements("x = 'a'(1)\ny = 2");

    assert_eq!(stmts[0].kind, SyntaxKind::Error);
    assert_eq!(stmts[1].kind, SyntaxKind::AssignmentStatement);
}

#[test]
fn test_lexer_error_keeps_surrounding_statements() {
    let stmts = statements("x = 1\ny = f(1, $)\nz = 'open\nw = 4\n");

    assert_eq!(stmts.len(), 4);
    assert_eq!(stmts[0].kind, SyntaxKind::AssignmentStatement);
    assert_eq!(stmts[1].kind, SyntaxKind::Error);
    assert!(stmts[1].text.contains("unrecognised token"));
    assert_eq!(stmts[2].kind, SyntaxKind::Error);
    assert_eq!(stmts[3].kind, SyntaxKind::AssignmentStatement);
}
