//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Integer literals in all bases
//! - String literals with escape sequences, multi-line and format strings
//! - Operators and punctuation
//! - Newline handling inside brackets
//! - Error cases

use super::{
    lexer::{parse_integer, tokenize, tokenize_recovering},
    tokens::TokenKind,
};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).unwrap().iter().map(|t| t.kind).collect()
}

#[test]
fn test_tokenize_keywords() {
    let tokens = tokenize("if elif else endif foreach endforeach break continue and or not in true false").unwrap();

    assert_eq!(tokens[0].kind, TokenKind::If);
    assert_eq!(tokens[1].kind, TokenKind::Elif);
    assert_eq!(tokens[2].kind, TokenKind::Else);
    assert_eq!(tokens[3].kind, TokenKind::Endif);
    assert_eq!(tokens[4].kind, TokenKind::Foreach);
    assert_eq!(tokens[5].kind, TokenKind::Endforeach);
    assert_eq!(tokens[6].kind, TokenKind::Break);
    assert_eq!(tokens[7].kind, TokenKind::Continue);
    assert_eq!(tokens[8].kind, TokenKind::And);
    assert_eq!(tokens[9].kind, TokenKind::Or);
    assert_eq!(tokens[10].kind, TokenKind::Not);
    assert_eq!(tokens[11].kind, TokenKind::In);
    assert_eq!(tokens[12].kind, TokenKind::True);
    assert_eq!(tokens[13].kind, TokenKind::False);
    assert_eq!(tokens[14].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = tokenize("foo bar baz_123 _underscore iffy").unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].value, "_underscore");
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].value, "iffy");
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("42 0 0x1F 0o17 0b101").unwrap();

    assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Number));
    assert_eq!(tokens[2].value, "0x1F");
    assert_eq!(parse_integer(&tokens[2].value), Some(31));
    assert_eq!(parse_integer(&tokens[3].value), Some(15));
    assert_eq!(parse_integer(&tokens[4].value), Some(5));
}

#[test]
fn test_number_overflow() {
    let result = tokenize("x = 99999999999999999999999");
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "NumberParseError");
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize(r"'hello' 'it\'s' 'a\nb' '\x41é'").unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "it's");
    assert_eq!(tokens[2].value, "a\nb");
    assert_eq!(tokens[3].value, "Aé");
}

#[test]
fn test_tokenize_multiline_and_format_strings() {
    let tokens = tokenize("x = '''line1\nline2'''\ny = f'@name@'").unwrap();

    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[2].value, "line1\nline2");
    assert_eq!(tokens[3].kind, TokenKind::Newline);
    assert_eq!(tokens[4].location.start_line, 2);
    assert_eq!(tokens[6].kind, TokenKind::FormatString);
    assert_eq!(tokens[6].value, "@name@");
}

#[test]
fn test_unterminated_string() {
    let result = tokenize("x = 'abc\ny = 1");
    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "UnterminatedString");
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("= += -= *= /= %= == != < <= > >= + - * / % ! ? : , ."),
        vec![
            TokenKind::Assignment,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::PercentEquals,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Bang,
            TokenKind::Question,
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_newlines_inside_brackets_are_skipped() {
    assert_eq!(
        kinds("x = [\n  1,\n  2,\n]\ny = 3"),
        vec![
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::OpenBracket,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::CloseBracket,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_comments_and_continuations() {
    assert_eq!(
        kinds("x = 1 \\\n + 2 # trailing\n# full line\ny"),
        vec![
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Plus,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_token_locations() {
    let tokens = tokenize("a = 1\n  bb = 'x'").unwrap();

    assert_eq!(tokens[0].location.start_line, 0);
    assert_eq!(tokens[0].location.start_column, 0);
    assert_eq!(tokens[4].value, "bb");
    assert_eq!(tokens[4].location.start_line, 1);
    assert_eq!(tokens[4].location.start_column, 2);
    assert_eq!(tokens[4].location.end_column, 4);
    assert_eq!(tokens[6].location.start_column, 7);
    assert_eq!(tokens[6].location.end_column, 10);
}

#[test]
fn test_unrecognised_token() {
    let result = tokenize("x = $");
    assert!(result.is_err());

    let error = result.err().unwrap();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_location().start_column, 4);
}

#[test]
fn test_recovering_lexer_keeps_tokenizing() {
    let (tokens, errors) = tokenize_recovering("x = $\ny = 2\n");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "UnrecognisedToken");
    assert_eq!(tokens[2].kind, TokenKind::Invalid);
    assert_eq!(tokens[2].value, "$");
    assert_eq!(tokens[2].location, *errors[0].get_location());
    assert_eq!(tokens[4].value, "y");
    assert_eq!(tokens.last().unwrap().kind, TokenKind::EOF);
}

#[test]
fn test_unterminated_string_spans_rest_of_line() {
    let (tokens, errors) = tokenize_recovering("a = 'abc + 1\nb = 2");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "UnterminatedString");
    assert_eq!(tokens[2].kind, TokenKind::Invalid);
    assert_eq!(tokens[2].value, "'abc + 1");
    assert_eq!(tokens[3].kind, TokenKind::Newline);
    assert_eq!(tokens[4].value, "b");
}
