use std::path::PathBuf;

use indoc::indoc;

use super::{
    ast::{AssignmentOperator, Ast, BinaryOperator, NodeId, NodeKind},
    parse_ast,
    visitor::CodeVisitor,
};

fn parse(source: &str) -> Ast {
    parse_ast(PathBuf::from("meson.build"), source)
}

fn statements(ast: &Ast) -> Vec<NodeId> {
    let NodeKind::SourceFile { build_definition } = ast.kind(ast.root()) else {
        panic!("root is not a source file");
    };
    match ast.kind(*build_definition) {
        NodeKind::BuildDefinition { stmts } => stmts.clone(),
        other => panic!("expected build definition, got {:?}", other),
    }
}

#[derive(Default)]
struct Counter {
    ids: Vec<String>,
    strings: usize,
    calls: usize,
}

impl CodeVisitor for Counter {
    fn visit_id_expression(&mut self, ast: &Ast, id: NodeId) {
        self.ids.push(ast.id_name(id).unwrap_or_default().to_string());
    }

    fn visit_string_literal(&mut self, _ast: &Ast, _id: NodeId) {
        self.strings += 1;
    }

    fn visit_function_expression(&mut self, ast: &Ast, id: NodeId) {
        self.calls += 1;
        ast.visit_children(id, self);
    }

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

    fn visit_boolean_literal(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_integer_literal(&mut self, _ast: &Ast, _id: NodeId) {}
}

#[test]
fn test_assignment_with_operator() {
    let ast = parse("x += 1\n");
    let stmts = statements(&ast);
    assert_eq!(stmts.len(), 1);

    let NodeKind::AssignmentStatement { lhs, op, rhs } = ast.kind(stmts[0]) else {
        panic!("expected assignment");
    };
    assert_eq!(*op, AssignmentOperator::PlusEquals);
    assert_eq!(ast.id_name(*lhs), Some("x"));
    assert_eq!(ast.kind(*rhs), &NodeKind::IntegerLiteral { value: 1 });
}

#[test]
fn test_selection_statement_shape() {
    let ast = parse(indoc! {"
        if a
          x = 1
        elif b
          x = 2
          y = 3
        else
        endif
    "});
    let stmts = statements(&ast);

    let NodeKind::SelectionStatement { conditions, blocks } = ast.kind(stmts[0]) else {
        panic!("expected selection statement");
    };
    assert_eq!(conditions.len(), 2);
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].len(), 1);
    assert_eq!(blocks[1].len(), 2);
    assert!(blocks[2].is_empty());
}

#[test]
fn test_iteration_statement_shape() {
    let ast = parse(indoc! {"
        foreach k, v : {'a': 1}
          message(k)
        endforeach
    "});
    let stmts = statements(&ast);

    let NodeKind::IterationStatement {
        ids,
        expression,
        block,
    } = ast.kind(stmts[0])
    else {
        panic!("expected iteration statement");
    };
    assert_eq!(ids.len(), 2);
    assert_eq!(ast.id_name(ids[1]), Some("v"));
    assert!(matches!(
        ast.kind(*expression),
        NodeKind::DictionaryLiteral { .. }
    ));
    assert_eq!(block.len(), 1);
}

#[test]
fn test_call_arguments() {
    let ast = parse("executable('foo', 'a.c', install: true)\n");
    let call = statements(&ast)[0];

    assert_eq!(ast.function_name(call), Some("executable"));
    let (positional, keyword) = ast.call_arguments(ast.call_args(call));
    assert_eq!(positional.len(), 2);
    assert_eq!(keyword.len(), 1);
    assert_eq!(keyword[0].0, "install");
    assert_eq!(ast.keyword_argument(call, "install"), Some(keyword[0].1));
    assert_eq!(ast.string_value(positional[1]), Some("a.c"));
}

#[test]
fn test_empty_call_has_no_argument_list() {
    let ast = parse("x = meson.version()\n");
    let NodeKind::AssignmentStatement { rhs, .. } = ast.kind(statements(&ast)[0]) else {
        panic!("expected assignment");
    };
    let NodeKind::MethodExpression { args, .. } = ast.kind(*rhs) else {
        panic!("expected method call");
    };
    assert!(args.is_none());
}

#[test]
fn test_syntax_error_becomes_error_node() {
    let ast = parse("x = (\ny = 2\n");
    let stmts = statements(&ast);
    assert!(stmts
        .iter()
        .any(|stmt| matches!(ast.kind(*stmt), NodeKind::ErrorNode { .. })));
}

#[test]
fn test_parents_are_set() {
    let ast = parse("x = [1, 2 + 3]\n");
    let stmt = statements(&ast)[0];
    let NodeKind::AssignmentStatement { rhs, .. } = ast.kind(stmt) else {
        panic!("expected assignment");
    };
    assert_eq!(ast.parent(*rhs), Some(stmt));
    assert_eq!(ast.parent(ast.root()), None);

    for child in ast.children(*rhs) {
        assert_eq!(ast.parent(child), Some(*rhs));
    }
}

#[test]
fn test_literal_subdir_is_patched() {
    let ast = parse("subdir('src')\n");
    let call = statements(&ast)[0];
    match ast.kind(call) {
        NodeKind::SubdirCall { dir, .. } => assert_eq!(dir, "src"),
        other => panic!("expected subdir call, got {:?}", other),
    }
}

#[test]
fn test_subdir_from_variable() {
    let ast = parse(indoc! {"
        d = 'lib'
        if get_option('tests')
          d += 'tests'
        endif
        subdir(d)
    "});
    let call = *statements(&ast).last().unwrap();
    match ast.kind(call) {
        NodeKind::MultiSubdirCall { dirs, .. } => {
            assert!(dirs.contains(&String::from("lib")));
            assert!(dirs.contains(&String::from("tests")));
        }
        other => panic!("expected multi subdir call, got {:?}", other),
    }
}

#[test]
fn test_subdir_from_loop_variable() {
    let ast = parse(indoc! {"
        dirs = ['a', 'b']
        foreach d : dirs
          subdir('modules' / d)
        endforeach
    "});
    let NodeKind::IterationStatement { block, .. } = ast.kind(statements(&ast)[1]) else {
        panic!("expected loop");
    };
    match ast.kind(block[0]) {
        NodeKind::MultiSubdirCall { dirs, .. } => {
            assert_eq!(dirs, &vec![String::from("modules/a"), String::from("modules/b")]);
        }
        other => panic!("expected multi subdir call, got {:?}", other),
    }
}

#[test]
fn test_visitor_walks_every_node() {
    let ast = parse(indoc! {"
        project('demo', 'c')
        foo = files('a.c', 'b.c')
        if foo.length() > 1
          executable('demo', foo)
        endif
    "});

    let mut counter = Counter::default();
    ast.visit(ast.root(), &mut counter);

    assert_eq!(counter.calls, 3);
    assert_eq!(counter.strings, 5);
    assert!(counter.ids.contains(&String::from("foo")));
    assert!(counter.ids.contains(&String::from("length")));
}

#[test]
fn test_deep_clone_is_structurally_equal() {
    let mut ast = parse("x = foo(1, k: [a, 'b'])[0] + (c ? 1 : 2)\n");
    let stmt = statements(&ast)[0];
    let clone = ast.deep_clone(stmt);

    assert_ne!(clone, stmt);
    assert!(ast.structurally_equal(stmt, &ast, clone));
    assert!(ast.types(clone).is_empty());

    let other = parse("x = foo(1, k: [a, 'c'])[0] + (c ? 1 : 2)\n");
    assert!(!ast.structurally_equal(stmt, &other, statements(&other)[0]));
}

fn subtree(ast: &Ast, id: NodeId) -> Vec<NodeId> {
    let mut nodes = vec![id];
    for child in ast.children(id) {
        nodes.extend(subtree(ast, child));
    }
    nodes
}

#[test]
fn test_deep_clone_of_every_node_kind_is_independent() {
    let source = indoc! {"
        project('demo', 'c')
        x = 1
        y = not true
        d = {'k': x}
        l = [x, 2]
        if x > 0
          z = x == 1 ? 'a' : 'b'
        elif x < 0
          z = l[0]
        endif
        foreach i : l
          if i == 2
            break
          endif
          continue
        endforeach
        s = 'abc'.to_upper()
        executable('e', 'e.c', install: true)
        subdir('sub')
        foreach dir : ['a', 'b']
          subdir(dir)
        endforeach
        w = )
    "};
    let mut ast = parse(source);
    let root = ast.root();
    let clone = ast.deep_clone(root);

    let original_nodes = subtree(&ast, root);
    let cloned_nodes = subtree(&ast, clone);
    assert_eq!(original_nodes.len(), cloned_nodes.len());
    assert!(original_nodes.iter().all(|id| !cloned_nodes.contains(id)));

    let mut kinds = cloned_nodes
        .iter()
        .map(|id| ast.kind(*id).name())
        .collect::<Vec<_>>();
    kinds.sort();
    kinds.dedup();
    assert_eq!(kinds.len(), 25, "{:?}", kinds);
    assert!(ast.structurally_equal(root, &ast, clone));

    let idx = cloned_nodes
        .iter()
        .position(|id| matches!(ast.kind(*id), NodeKind::IntegerLiteral { .. }))
        .unwrap();
    ast.replace_kind(
        cloned_nodes[idx],
        NodeKind::StringLiteral {
            value: String::from("changed"),
            is_format: false,
        },
    );

    assert_eq!(
        ast.kind(original_nodes[idx]),
        &NodeKind::IntegerLiteral { value: 1 }
    );
    assert!(!ast.structurally_equal(root, &ast, clone));
    let fresh = parse(source);
    assert!(ast.structurally_equal(root, &fresh, fresh.root()));
}

#[test]
fn test_structural_equality_ignores_locations() {
    let a = parse("x = 1 + 2\n");
    let b = parse("\n\n   x   =   1+2\n");
    assert!(a.structurally_equal(a.root(), &b, b.root()));
}

#[test]
fn test_not_in_operator() {
    let ast = parse("x = 'a' not in ['b']\n");
    let NodeKind::AssignmentStatement { rhs, .. } = ast.kind(statements(&ast)[0]) else {
        panic!("expected assignment");
    };
    assert!(matches!(
        ast.kind(*rhs),
        NodeKind::BinaryExpression {
            op: BinaryOperator::NotIn,
            ..
        }
    ));
}
