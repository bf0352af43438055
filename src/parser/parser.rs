//! Parser implementation for building the concrete syntax tree.
//!
//! This module contains the main Parser struct and the parsing entry points.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statement parsing.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence

use std::collections::HashMap;

use tracing::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::tokenize_recovering,
        tokens::{Token, TokenKind},
    },
    Location,
};

use super::{
    cst::{SyntaxKind, SyntaxNode},
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler,
        NUDLookup, StmtHandler, StmtLookup,
    },
    stmt::parse_block,
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream and maintains lookup tables for
/// parsing statements and expressions. It tracks the current position in
/// the token stream and records every syntax error it recovered from.
pub struct Parser {
    /// The list of tokens to parse
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Syntax errors turned into `ERROR` nodes
    errors: Vec<Error>,
    /// Errors behind the `Invalid` tokens of the stream
    lexical_errors: Vec<Error>,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Vector of tokens to parse, terminated by an EOF token
    ///
    /// # Returns
    ///
    /// A new Parser instance ready to parse the token stream.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EOF) {
            let end = tokens.last().map(|t| t.location).unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                location: end,
            });
        }

        Parser {
            tokens,
            pos: 0,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            errors: vec![],
            lexical_errors: vec![],
        }
    }

    /// Attaches the errors reported by `tokenize_recovering` for this
    /// token stream.
    pub fn with_lexical_errors(mut self, errors: Vec<Error>) -> Self {
        self.lexical_errors = errors;
        self
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> &Token {
        let last = self.tokens.len() - 1;
        let current = self.pos.min(last);
        if self.pos < last {
            self.pos += 1;
        }
        &self.tokens[current]
    }

    /// Expects a token of the specified kind, with optional custom message.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    /// * `message` - Optional detail explaining what was expected
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns an Error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        message: Option<&str>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind == expected_kind {
            return Ok(self.advance().clone());
        }

        let internal = match message {
            Some(message) => ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: message.to_string(),
            },
            None => ErrorImpl::UnexpectedToken {
                token: token.value.clone(),
            },
        };
        Err(Error::new(internal, token.location))
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Skips blank lines.
    pub fn skip_newlines(&mut self) {
        while self.current_token_kind() == TokenKind::Newline {
            self.advance();
        }
    }

    /// Skips to the start of the next line, used after a syntax error.
    pub fn synchronize(&mut self) {
        while !matches!(
            self.current_token_kind(),
            TokenKind::Newline | TokenKind::EOF
        ) {
            self.advance();
        }
        self.skip_newlines();
    }

    pub fn record_error(&mut self, error: Error) {
        debug!("recovering from syntax error: {}", error);
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// The lexical error behind the current `Invalid` token.
    pub fn invalid_token_error(&self) -> Error {
        let token = self.current_token();
        self.lexical_errors
            .iter()
            .find(|error| *error.get_location() == token.location)
            .cloned()
            .unwrap_or_else(|| {
                Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: token.value.clone(),
                    },
                    token.location,
                )
            })
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this infix operator
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Prefix handlers do not touch the binding power table, so a token may
    /// be both a prefix and an infix operator (`-`, `not`).
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Returns the location of the current token.
    pub fn get_location(&self) -> Location {
        self.current_token().location
    }

    /// Returns the location of the most recently consumed token.
    pub fn previous_location(&self) -> Location {
        self.tokens[self.pos.saturating_sub(1)].location
    }
}

/// Parses a stream of tokens into a `source_file` syntax tree.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses statements until EOF. Syntax
/// errors never abort parsing: each becomes an `ERROR` node and the parser
/// resumes on the next line.
///
/// # Arguments
///
/// * `tokens` - Vector of tokens to parse
///
/// # Returns
///
/// A tuple containing:
/// - The Parser instance (with the recorded syntax errors)
/// - The root `source_file` node
pub fn parse(tokens: Vec<Token>) -> (Parser, SyntaxNode) {
    parse_with(Parser::new(tokens))
}

fn parse_with(mut parser: Parser) -> (Parser, SyntaxNode) {
    create_token_lookups(&mut parser);

    let start = parser.get_location();
    let statements = parse_block(&mut parser, &[]);

    let mut build_definition = SyntaxNode::branch(
        SyntaxKind::BuildDefinition,
        start.to(&parser.previous_location()),
    );
    for statement in statements {
        build_definition.push_child(statement);
    }

    let root = SyntaxNode::branch(SyntaxKind::SourceFile, build_definition.location)
        .with_child(build_definition);
    (parser, root)
}

/// Tokenizes and parses `source`.
///
/// Lexical errors do not stop parsing: the statement holding the bad text
/// becomes an `ERROR` node and the rest of the file is parsed as usual.
pub fn parse_source(source: &str) -> SyntaxNode {
    let (tokens, lexical_errors) = tokenize_recovering(source);
    parse_with(Parser::new(tokens).with_lexical_errors(lexical_errors)).1
}
