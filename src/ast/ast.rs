use std::{fmt::Display, path::PathBuf};

use crate::{types::types::TypeSet, Location};

/// Index of a node inside its owning `Ast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOperator {
    Equals,
    PlusEquals,
    MinusEquals,
    MulEquals,
    DivEquals,
    ModEquals,
}

impl AssignmentOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        match op {
            "=" => Some(AssignmentOperator::Equals),
            "+=" => Some(AssignmentOperator::PlusEquals),
            "-=" => Some(AssignmentOperator::MinusEquals),
            "*=" => Some(AssignmentOperator::MulEquals),
            "/=" => Some(AssignmentOperator::DivEquals),
            "%=" => Some(AssignmentOperator::ModEquals),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOperator::Equals => "=",
            AssignmentOperator::PlusEquals => "+=",
            AssignmentOperator::MinusEquals => "-=",
            AssignmentOperator::MulEquals => "*=",
            AssignmentOperator::DivEquals => "/=",
            AssignmentOperator::ModEquals => "%=",
        }
    }

    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary(&self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Equals => None,
            AssignmentOperator::PlusEquals => Some(BinaryOperator::Plus),
            AssignmentOperator::MinusEquals => Some(BinaryOperator::Minus),
            AssignmentOperator::MulEquals => Some(BinaryOperator::Mul),
            AssignmentOperator::DivEquals => Some(BinaryOperator::Div),
            AssignmentOperator::ModEquals => Some(BinaryOperator::Modulo),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Mul,
    Div,
    Modulo,
    Equals,
    NotEquals,
    Greater,
    Less,
    GreaterEquals,
    LessEquals,
    In,
    NotIn,
    And,
    Or,
}

impl BinaryOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        match op {
            "+" => Some(BinaryOperator::Plus),
            "-" => Some(BinaryOperator::Minus),
            "*" => Some(BinaryOperator::Mul),
            "/" => Some(BinaryOperator::Div),
            "%" => Some(BinaryOperator::Modulo),
            "==" => Some(BinaryOperator::Equals),
            "!=" => Some(BinaryOperator::NotEquals),
            ">" => Some(BinaryOperator::Greater),
            "<" => Some(BinaryOperator::Less),
            ">=" => Some(BinaryOperator::GreaterEquals),
            "<=" => Some(BinaryOperator::LessEquals),
            "in" => Some(BinaryOperator::In),
            "not in" => Some(BinaryOperator::NotIn),
            "and" => Some(BinaryOperator::And),
            "or" => Some(BinaryOperator::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::Less => "<",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::In => "in",
            BinaryOperator::NotIn => "not in",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    ExclamationMark,
    Minus,
}

impl UnaryOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        match op {
            "not" => Some(UnaryOperator::Not),
            "!" => Some(UnaryOperator::ExclamationMark),
            "-" => Some(UnaryOperator::Minus),
            _ => None,
        }
    }
}

/// Node Kinds
///
/// Children are referenced by `NodeId` into the owning arena. Every child id
/// appears in exactly one slot of exactly one parent.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    SourceFile {
        build_definition: NodeId,
    },
    BuildDefinition {
        stmts: Vec<NodeId>,
    },
    ErrorNode {
        message: String,
    },
    AssignmentStatement {
        lhs: NodeId,
        op: AssignmentOperator,
        rhs: NodeId,
    },
    /// `conditions.len()` is n, `blocks.len()` is n or n + 1 (trailing else).
    SelectionStatement {
        conditions: Vec<NodeId>,
        blocks: Vec<Vec<NodeId>>,
    },
    IterationStatement {
        ids: Vec<NodeId>,
        expression: NodeId,
        block: Vec<NodeId>,
    },
    BreakStatement,
    ContinueStatement,
    BinaryExpression {
        lhs: NodeId,
        op: BinaryOperator,
        rhs: NodeId,
    },
    UnaryExpression {
        op: UnaryOperator,
        expression: NodeId,
    },
    ConditionalExpression {
        condition: NodeId,
        if_true: NodeId,
        if_false: NodeId,
    },
    SubscriptExpression {
        outer: NodeId,
        inner: NodeId,
    },
    FunctionExpression {
        id: NodeId,
        args: Option<NodeId>,
    },
    MethodExpression {
        obj: NodeId,
        id: NodeId,
        args: Option<NodeId>,
    },
    /// `subdir('literal')`
    SubdirCall {
        id: NodeId,
        args: Option<NodeId>,
        dir: String,
    },
    /// `subdir(expr)` with candidate directories found heuristically.
    MultiSubdirCall {
        id: NodeId,
        args: Option<NodeId>,
        dirs: Vec<String>,
    },
    ArgumentList {
        args: Vec<NodeId>,
    },
    KeywordItem {
        key: NodeId,
        value: NodeId,
    },
    KeyValueItem {
        key: NodeId,
        value: NodeId,
    },
    ArrayLiteral {
        args: Vec<NodeId>,
    },
    DictionaryLiteral {
        values: Vec<NodeId>,
    },
    IdExpression {
        id: String,
    },
    BooleanLiteral {
        value: bool,
    },
    IntegerLiteral {
        value: i64,
    },
    StringLiteral {
        value: String,
        is_format: bool,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::SourceFile { .. } => "SourceFile",
            NodeKind::BuildDefinition { .. } => "BuildDefinition",
            NodeKind::ErrorNode { .. } => "ErrorNode",
            NodeKind::AssignmentStatement { .. } => "AssignmentStatement",
            NodeKind::SelectionStatement { .. } => "SelectionStatement",
            NodeKind::IterationStatement { .. } => "IterationStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::SubscriptExpression { .. } => "SubscriptExpression",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::MethodExpression { .. } => "MethodExpression",
            NodeKind::SubdirCall { .. } => "SubdirCall",
            NodeKind::MultiSubdirCall { .. } => "MultiSubdirCall",
            NodeKind::ArgumentList { .. } => "ArgumentList",
            NodeKind::KeywordItem { .. } => "KeywordItem",
            NodeKind::KeyValueItem { .. } => "KeyValueItem",
            NodeKind::ArrayLiteral { .. } => "ArrayLiteral",
            NodeKind::DictionaryLiteral { .. } => "DictionaryLiteral",
            NodeKind::IdExpression { .. } => "IdExpression",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::IntegerLiteral { .. } => "IntegerLiteral",
            NodeKind::StringLiteral { .. } => "StringLiteral",
        }
    }

    /// Owned children, left to right in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::SourceFile { build_definition } => vec![*build_definition],
            NodeKind::BuildDefinition { stmts } => stmts.clone(),
            NodeKind::AssignmentStatement { lhs, rhs, .. }
            | NodeKind::BinaryExpression { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::SelectionStatement { conditions, blocks } => {
                let mut children = vec![];
                for (idx, block) in blocks.iter().enumerate() {
                    if let Some(condition) = conditions.get(idx) {
                        children.push(*condition);
                    }
                    children.extend(block.iter().copied());
                }
                children
            }
            NodeKind::IterationStatement {
                ids,
                expression,
                block,
            } => {
                let mut children = ids.clone();
                children.push(*expression);
                children.extend(block.iter().copied());
                children
            }
            NodeKind::UnaryExpression { expression, .. } => vec![*expression],
            NodeKind::ConditionalExpression {
                condition,
                if_true,
                if_false,
            } => vec![*condition, *if_true, *if_false],
            NodeKind::SubscriptExpression { outer, inner } => vec![*outer, *inner],
            NodeKind::FunctionExpression { id, args }
            | NodeKind::SubdirCall { id, args, .. }
            | NodeKind::MultiSubdirCall { id, args, .. } => {
                let mut children = vec![*id];
                children.extend(args.iter().copied());
                children
            }
            NodeKind::MethodExpression { obj, id, args } => {
                let mut children = vec![*obj, *id];
                children.extend(args.iter().copied());
                children
            }
            NodeKind::ArgumentList { args } | NodeKind::ArrayLiteral { args } => args.clone(),
            NodeKind::DictionaryLiteral { values } => values.clone(),
            NodeKind::KeywordItem { key, value } | NodeKind::KeyValueItem { key, value } => {
                vec![*key, *value]
            }
            NodeKind::ErrorNode { .. }
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::IdExpression { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::IntegerLiteral { .. }
            | NodeKind::StringLiteral { .. } => vec![],
        }
    }

    /// Rebuilds this kind with every child id passed through `f`.
    pub fn map_children(&self, f: &mut impl FnMut(NodeId) -> NodeId) -> NodeKind {
        fn list(ids: &[NodeId], f: &mut dyn FnMut(NodeId) -> NodeId) -> Vec<NodeId> {
            ids.iter().map(|id| f(*id)).collect()
        }

        match self {
            NodeKind::SourceFile { build_definition } => NodeKind::SourceFile {
                build_definition: f(*build_definition),
            },
            NodeKind::BuildDefinition { stmts } => NodeKind::BuildDefinition {
                stmts: list(stmts, f),
            },
            NodeKind::AssignmentStatement { lhs, op, rhs } => NodeKind::AssignmentStatement {
                lhs: f(*lhs),
                op: *op,
                rhs: f(*rhs),
            },
            NodeKind::SelectionStatement { conditions, blocks } => {
                let mut new_conditions = vec![];
                let mut new_blocks = vec![];
                for (idx, block) in blocks.iter().enumerate() {
                    if let Some(condition) = conditions.get(idx) {
                        new_conditions.push(f(*condition));
                    }
                    new_blocks.push(list(block, f));
                }
                NodeKind::SelectionStatement {
                    conditions: new_conditions,
                    blocks: new_blocks,
                }
            }
            NodeKind::IterationStatement {
                ids,
                expression,
                block,
            } => {
                let ids = list(ids, f);
                let expression = f(*expression);
                NodeKind::IterationStatement {
                    ids,
                    expression,
                    block: list(block, f),
                }
            }
            NodeKind::BinaryExpression { lhs, op, rhs } => NodeKind::BinaryExpression {
                lhs: f(*lhs),
                op: *op,
                rhs: f(*rhs),
            },
            NodeKind::UnaryExpression { op, expression } => NodeKind::UnaryExpression {
                op: *op,
                expression: f(*expression),
            },
            NodeKind::ConditionalExpression {
                condition,
                if_true,
                if_false,
            } => NodeKind::ConditionalExpression {
                condition: f(*condition),
                if_true: f(*if_true),
                if_false: f(*if_false),
            },
            NodeKind::SubscriptExpression { outer, inner } => NodeKind::SubscriptExpression {
                outer: f(*outer),
                inner: f(*inner),
            },
            NodeKind::FunctionExpression { id, args } => NodeKind::FunctionExpression {
                id: f(*id),
                args: args.map(&mut *f),
            },
            NodeKind::SubdirCall { id, args, dir } => NodeKind::SubdirCall {
                id: f(*id),
                args: args.map(&mut *f),
                dir: dir.clone(),
            },
            NodeKind::MultiSubdirCall { id, args, dirs } => NodeKind::MultiSubdirCall {
                id: f(*id),
                args: args.map(&mut *f),
                dirs: dirs.clone(),
            },
            NodeKind::MethodExpression { obj, id, args } => NodeKind::MethodExpression {
                obj: f(*obj),
                id: f(*id),
                args: args.map(&mut *f),
            },
            NodeKind::ArgumentList { args } => NodeKind::ArgumentList {
                args: list(args, f),
            },
            NodeKind::ArrayLiteral { args } => NodeKind::ArrayLiteral {
                args: list(args, f),
            },
            NodeKind::DictionaryLiteral { values } => NodeKind::DictionaryLiteral {
                values: list(values, f),
            },
            NodeKind::KeywordItem { key, value } => NodeKind::KeywordItem {
                key: f(*key),
                value: f(*value),
            },
            NodeKind::KeyValueItem { key, value } => NodeKind::KeyValueItem {
                key: f(*key),
                value: f(*value),
            },
            leaf => leaf.clone(),
        }
    }

    /// Scalar payload compared by `Ast::structurally_equal`.
    fn label(&self) -> String {
        match self {
            NodeKind::ErrorNode { message } => format!("error:{}", message),
            NodeKind::AssignmentStatement { op, .. } => format!("assign:{}", op.as_str()),
            NodeKind::SelectionStatement { conditions, blocks } => format!(
                "select:{}:{:?}",
                conditions.len(),
                blocks.iter().map(|b| b.len()).collect::<Vec<_>>()
            ),
            NodeKind::IterationStatement { ids, block, .. } => {
                format!("foreach:{}:{}", ids.len(), block.len())
            }
            NodeKind::BinaryExpression { op, .. } => format!("binary:{}", op.as_str()),
            NodeKind::UnaryExpression { op, .. } => format!("unary:{:?}", op),
            NodeKind::FunctionExpression { args, .. }
            | NodeKind::MethodExpression { args, .. } => {
                format!("{}:{}", self.name(), args.is_some())
            }
            NodeKind::SubdirCall { args, dir, .. } => format!("subdir:{}:{}", args.is_some(), dir),
            NodeKind::MultiSubdirCall { args, dirs, .. } => {
                format!("multisubdir:{}:{:?}", args.is_some(), dirs)
            }
            NodeKind::IdExpression { id } => format!("id:{}", id),
            NodeKind::BooleanLiteral { value } => format!("bool:{}", value),
            NodeKind::IntegerLiteral { value } => format!("int:{}", value),
            NodeKind::StringLiteral { value, is_format } => format!("str:{}:{}", is_format, value),
            other => other.name().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub location: Location,
    parent: Option<NodeId>,
    /// Types inferred by the analyzer, empty until it has run.
    pub types: TypeSet,
}

/// Arena holding every node of one build-description file.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
    file: PathBuf,
    parents_set: bool,
}

impl Ast {
    pub fn new(file: PathBuf) -> Self {
        Ast {
            nodes: vec![],
            root: NodeId(0),
            file,
            parents_set: false,
        }
    }

    pub fn add(&mut self, kind: NodeKind, location: Location) -> NodeId {
        self.nodes.push(Node {
            kind,
            location,
            parent: None,
            types: TypeSet::new(),
        });
        self.parents_set = false;
        NodeId(self.nodes.len() - 1)
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn file(&self) -> &PathBuf {
        &self.file
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn location(&self, id: NodeId) -> Location {
        self.nodes[id.0].location
    }

    pub fn types(&self, id: NodeId) -> &TypeSet {
        &self.nodes[id.0].types
    }

    pub fn set_types(&mut self, id: NodeId, types: TypeSet) {
        self.nodes[id.0].types = types;
    }

    /// Replaces a node's kind in place, keeping its id and location.
    pub fn replace_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.0].kind = kind;
        self.parents_set = false;
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// The syntactic parent. Only meaningful after `set_parents`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        debug_assert!(self.parents_set, "parent() read before set_parents()");
        self.nodes[id.0].parent
    }

    /// Establishes the parent edge of every node reachable from the root.
    pub fn set_parents(&mut self) {
        let mut stack = vec![self.root];
        if let Some(root) = self.nodes.get_mut(self.root.0) {
            root.parent = None;
        }

        while let Some(id) = stack.pop() {
            for child in self.children(id) {
                self.nodes[child.0].parent = Some(id);
                stack.push(child);
            }
        }
        self.parents_set = true;
    }

    /// Deep-copies the subtree at `id` into this arena.
    ///
    /// Clones have empty parents and empty type slots until `set_parents`
    /// runs and the analyzer visits them.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id).clone();
        let location = self.location(id);
        let cloned = kind.map_children(&mut |child| self.deep_clone(child));
        let new_id = self.add(cloned, location);
        self.parents_set = false;
        new_id
    }

    /// Compares two subtrees, ignoring locations, ids, parents and types.
    pub fn structurally_equal(&self, a: NodeId, other: &Ast, b: NodeId) -> bool {
        let left = self.kind(a);
        let right = other.kind(b);
        if left.label() != right.label() {
            return false;
        }

        let left_children = left.children();
        let right_children = right.children();
        left_children.len() == right_children.len()
            && left_children
                .iter()
                .zip(right_children.iter())
                .all(|(l, r)| self.structurally_equal(*l, other, *r))
    }

    /// Name of an `IdExpression`, if `id` is one.
    pub fn id_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::IdExpression { id } => Some(id),
            _ => None,
        }
    }

    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::StringLiteral { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Name of the called function for function expressions and include calls.
    pub fn function_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::FunctionExpression { id, .. }
            | NodeKind::SubdirCall { id, .. }
            | NodeKind::MultiSubdirCall { id, .. } => self.id_name(*id),
            _ => None,
        }
    }

    /// Positional and keyword arguments of a call's argument list.
    pub fn call_arguments(&self, args: Option<NodeId>) -> (Vec<NodeId>, Vec<(String, NodeId)>) {
        let mut positional = vec![];
        let mut keyword = vec![];

        if let Some(NodeKind::ArgumentList { args }) = args.map(|id| self.kind(id)) {
            for arg in args {
                match self.kind(*arg) {
                    NodeKind::KeywordItem { key, value } => {
                        let name = self.id_name(*key).unwrap_or_default().to_string();
                        keyword.push((name, *value));
                    }
                    _ => positional.push(*arg),
                }
            }
        }

        (positional, keyword)
    }

    /// The argument list of a call-like node.
    pub fn call_args(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::FunctionExpression { args, .. }
            | NodeKind::MethodExpression { args, .. }
            | NodeKind::SubdirCall { args, .. }
            | NodeKind::MultiSubdirCall { args, .. } => *args,
            _ => None,
        }
    }

    pub fn keyword_argument(&self, call: NodeId, name: &str) -> Option<NodeId> {
        let (_, keyword) = self.call_arguments(self.call_args(call));
        keyword
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn positional_argument(&self, call: NodeId, idx: usize) -> Option<NodeId> {
        let (positional, _) = self.call_arguments(self.call_args(call));
        positional.get(idx).copied()
    }
}
