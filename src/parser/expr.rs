use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    cst::{SyntaxKind, SyntaxNode},
    lookups::BindingPower,
    parser::Parser,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<SyntaxNode, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_location(),
        ));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_location(),
            ));
        };
        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Text the lexer rejected; reports the lexer's error for it.
pub fn parse_invalid_expr(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    Err(parser.invalid_token_error())
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    let token = parser.advance().clone();

    let node = match token.kind {
        TokenKind::Number => SyntaxNode::leaf(SyntaxKind::IntegerLiteral, token.location, token.value),
        TokenKind::Identifier => SyntaxNode::leaf(SyntaxKind::IdExpression, token.location, token.value),
        TokenKind::String => SyntaxNode::leaf(SyntaxKind::StringLiteral, token.location, token.value),
        TokenKind::FormatString => {
            let mut node = SyntaxNode::leaf(SyntaxKind::StringLiteral, token.location, token.value);
            node.is_format = true;
            node
        }
        TokenKind::True | TokenKind::False => {
            SyntaxNode::leaf(SyntaxKind::BooleanLiteral, token.location, token.value)
        }
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.location,
            ))
        }
    };

    Ok(node)
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: SyntaxNode,
    bp: BindingPower,
) -> Result<SyntaxNode, Error> {
    let operator_token = parser.advance().clone();
    let right = parse_expr(parser, bp)?;

    Ok(
        SyntaxNode::branch(SyntaxKind::BinaryExpression, left.location.to(&right.location))
            .with_text(operator_token.value)
            .with_field("left", left)
            .with_field("right", right),
    )
}

/// `a not in b`
pub fn parse_not_in_expr(
    parser: &mut Parser,
    left: SyntaxNode,
    bp: BindingPower,
) -> Result<SyntaxNode, Error> {
    parser.advance();
    parser.expect_error(TokenKind::In, Some("expected `in` after `not`"))?;
    let right = parse_expr(parser, bp)?;

    Ok(
        SyntaxNode::branch(SyntaxKind::BinaryExpression, left.location.to(&right.location))
            .with_text("not in")
            .with_field("left", left)
            .with_field("right", right),
    )
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    let operator_token = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Unary)?;

    Ok(SyntaxNode::branch(
        SyntaxKind::UnaryExpression,
        operator_token.location.to(&rhs.location),
    )
    .with_text(operator_token.value)
    .with_field("argument", rhs))
}

pub fn parse_conditional_expr(
    parser: &mut Parser,
    condition: SyntaxNode,
    _bp: BindingPower,
) -> Result<SyntaxNode, Error> {
    parser.advance();
    let if_true = parse_expr(parser, BindingPower::Default)?;
    parser.expect_error(TokenKind::Colon, Some("expected `:` in conditional expression"))?;
    let if_false = parse_expr(parser, BindingPower::Assignment)?;

    Ok(SyntaxNode::branch(
        SyntaxKind::ConditionalExpression,
        condition.location.to(&if_false.location),
    )
    .with_field("condition", condition)
    .with_field("true", if_true)
    .with_field("false", if_false))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Parses the comma separated contents of `(...)` after the opening paren.
///
/// Returns `None` when the list is empty.
fn parse_arguments(parser: &mut Parser) -> Result<Option<SyntaxNode>, Error> {
    let start = parser.get_location();
    let mut arguments = SyntaxNode::branch(SyntaxKind::ArgumentList, start);

    while parser.current_token_kind() != TokenKind::CloseParen {
        let value = parse_expr(parser, BindingPower::Default)?;

        if parser.current_token_kind() == TokenKind::Colon {
            if value.kind != SyntaxKind::IdExpression {
                return Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: String::from(":"),
                        message: String::from("keyword argument names must be identifiers"),
                    },
                    parser.get_location(),
                ));
            }
            parser.advance();
            let kwarg_value = parse_expr(parser, BindingPower::Default)?;
            let item = SyntaxNode::branch(
                SyntaxKind::KeywordItem,
                value.location.to(&kwarg_value.location),
            )
            .with_field("key", value)
            .with_field("value", kwarg_value);
            arguments.push_child(item);
        } else {
            arguments.push_child(value);
        }

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    if arguments.children.is_empty() {
        return Ok(None);
    }
    arguments.location = start.to(&parser.previous_location());
    Ok(Some(arguments))
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: SyntaxNode,
    _bp: BindingPower,
) -> Result<SyntaxNode, Error> {
    if left.kind != SyntaxKind::IdExpression {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("("),
                message: String::from("only functions can be called"),
            },
            parser.get_location(),
        ));
    }

    parser.advance();
    let arguments = parse_arguments(parser)?;

    let mut call = SyntaxNode::branch(
        SyntaxKind::FunctionExpression,
        left.location.to(&parser.previous_location()),
    )
    .with_field("function", left);
    if let Some(arguments) = arguments {
        call = call.with_field("arguments", arguments);
    }
    Ok(call)
}

pub fn parse_method_expr(
    parser: &mut Parser,
    left: SyntaxNode,
    _bp: BindingPower,
) -> Result<SyntaxNode, Error> {
    parser.advance();
    let name = parser.expect_error(TokenKind::Identifier, Some("expected method name"))?;
    parser.expect_error(TokenKind::OpenParen, Some("expected `(` after method name"))?;
    let arguments = parse_arguments(parser)?;

    let mut call = SyntaxNode::branch(
        SyntaxKind::MethodExpression,
        left.location.to(&parser.previous_location()),
    )
    .with_field("object", left)
    .with_field(
        "name",
        SyntaxNode::leaf(SyntaxKind::IdExpression, name.location, name.value),
    );
    if let Some(arguments) = arguments {
        call = call.with_field("arguments", arguments);
    }
    Ok(call)
}

pub fn parse_subscript_expr(
    parser: &mut Parser,
    left: SyntaxNode,
    _bp: BindingPower,
) -> Result<SyntaxNode, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(SyntaxNode::branch(
        SyntaxKind::SubscriptExpression,
        left.location.to(&parser.previous_location()),
    )
    .with_field("object", left)
    .with_field("index", index))
}

pub fn parse_array_expr(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    let start = parser.advance().location;
    let mut array = SyntaxNode::branch(SyntaxKind::ArrayLiteral, start);

    while parser.current_token_kind() != TokenKind::CloseBracket {
        array.push_child(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseBracket)?;
    array.location = start.to(&parser.previous_location());
    Ok(array)
}

pub fn parse_dict_expr(parser: &mut Parser) -> Result<SyntaxNode, Error> {
    let start = parser.advance().location;
    let mut dict = SyntaxNode::branch(SyntaxKind::DictionaryLiteral, start);

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let key = parse_expr(parser, BindingPower::Default)?;
        parser.expect_error(TokenKind::Colon, Some("expected `:` after dictionary key"))?;
        let value = parse_expr(parser, BindingPower::Default)?;

        dict.push_child(
            SyntaxNode::branch(SyntaxKind::KeyValueItem, key.location.to(&value.location))
                .with_field("key", key)
                .with_field("value", value),
        );

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;
    dict.location = start.to(&parser.previous_location());
    Ok(dict)
}
