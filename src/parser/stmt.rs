use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Location,
};

use super::{
    cst::{SyntaxKind, SyntaxNode},
    parser::Parser,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    if let Some(handler) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    if !parser.current_token_kind().is_assignment_operator() {
        return Ok(expr);
    }

    let operator = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Default)?;

    Ok(
        SyntaxNode::branch(SyntaxKind::AssignmentStatement, expr.location.to(&rhs.location))
            .with_text(operator.value)
            .with_field("left", expr)
            .with_field("right", rhs),
    )
}

fn expect_end_of_statement(parser: &Parser) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::Newline | TokenKind::EOF => Ok(()),
        TokenKind::Invalid => Err(parser.invalid_token_error()),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected end of line"),
            },
            parser.get_location(),
        )),
    }
}

/// Parses statements until one of `terminators` (or EOF) is reached.
///
/// The terminator itself is not consumed. A statement that fails to parse
/// is replaced by an `ERROR` node and parsing resumes on the next line.
pub fn parse_block(parser: &mut Parser, terminators: &[TokenKind]) -> Vec<SyntaxNode> {
    let mut statements = vec![];

    loop {
        parser.skip_newlines();
        if !parser.has_tokens() || terminators.contains(&parser.current_token_kind()) {
            break;
        }

        let statement = parse_stmt(parser).and_then(|stmt| {
            expect_end_of_statement(parser)?;
            Ok(stmt)
        });

        match statement {
            Ok(statement) => statements.push(statement),
            Err(error) => {
                statements.push(SyntaxNode::error(*error.get_location(), error.to_string()));
                parser.record_error(error);
                parser.synchronize();
            }
        }
    }

    statements
}

fn make_block(statements: Vec<SyntaxNode>, fallback: Location) -> SyntaxNode {
    let location = match (statements.first(), statements.last()) {
        (Some(first), Some(last)) => first.location.to(&last.location),
        _ => fallback,
    };

    let mut block = SyntaxNode::branch(SyntaxKind::Block, location);
    for statement in statements {
        block.push_child(statement);
    }
    block
}

fn keyword(parser: &mut Parser) -> SyntaxNode {
    let token = parser.advance().clone();
    SyntaxNode::leaf(SyntaxKind::Keyword, token.location, token.value)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    let start = parser.get_location();
    let mut selection = SyntaxNode::branch(SyntaxKind::SelectionStatement, start);

    // if / elif clauses
    loop {
        let clause = keyword(parser);
        let clause_location = clause.location;
        selection.push_child(clause);

        let condition = parse_expr(parser, BindingPower::Default)?;
        selection = selection.with_field("condition", condition);

        let statements = parse_block(
            parser,
            &[TokenKind::Elif, TokenKind::Else, TokenKind::Endif],
        );
        selection = selection.with_field("block", make_block(statements, clause_location));

        if parser.current_token_kind() != TokenKind::Elif {
            break;
        }
    }

    if parser.current_token_kind() == TokenKind::Else {
        let clause = keyword(parser);
        let clause_location = clause.location;
        selection.push_child(clause);

        let statements = parse_block(parser, &[TokenKind::Endif]);
        selection = selection.with_field("block", make_block(statements, clause_location));
    }

    parser.expect_error(TokenKind::Endif, Some("expected `endif`"))?;
    selection.push_child(SyntaxNode::leaf(
        SyntaxKind::Keyword,
        parser.previous_location(),
        "endif",
    ));
    selection.location = start.to(&parser.previous_location());
    Ok(selection)
}

pub fn parse_foreach_stmt(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    let start = parser.advance().location;
    let mut iteration = SyntaxNode::branch(SyntaxKind::IterationStatement, start);

    let first = parser.expect_error(TokenKind::Identifier, Some("expected loop variable"))?;
    iteration = iteration.with_field(
        "id",
        SyntaxNode::leaf(SyntaxKind::IdExpression, first.location, first.value),
    );

    if parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        let second = parser.expect_error(TokenKind::Identifier, Some("expected loop variable"))?;
        iteration = iteration.with_field(
            "id",
            SyntaxNode::leaf(SyntaxKind::IdExpression, second.location, second.value),
        );
    }

    parser.expect_error(TokenKind::Colon, Some("expected `:` after loop variables"))?;
    let expression = parse_expr(parser, BindingPower::Default)?;
    let expression_location = expression.location;
    iteration = iteration.with_field("expression", expression);

    let statements = parse_block(parser, &[TokenKind::Endforeach]);
    iteration = iteration.with_field("block", make_block(statements, expression_location));

    parser.expect_error(TokenKind::Endforeach, Some("expected `endforeach`"))?;
    iteration.location = start.to(&parser.previous_location());
    Ok(iteration)
}

pub fn parse_jump_stmt(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    let token = parser.advance().clone();
    Ok(SyntaxNode::leaf(
        SyntaxKind::JumpStatement,
        token.location,
        token.value,
    ))
}
