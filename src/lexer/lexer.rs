use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Location, MK_DEFAULT_HANDLER, MK_NESTING_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).expect("token patterns are valid regular expressions"),
        handler,
    }
}

lazy_static! {
    // Order matters: the first pattern matching at the cursor wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("^[ \\t\\r]+", skip_handler),
        pattern("^\\\\\\r?\\n", skip_handler),
        pattern("^#[^\\n]*", skip_handler),
        pattern("^\\n", newline_handler),
        pattern("^f?'''(?s:.*?)'''", multiline_string_handler),
        pattern("^f?'''[^\\n]*", unterminated_string_handler),
        pattern("^f?'(?:[^'\\\\\\n]|\\\\.)*'", string_handler),
        pattern("^f?'[^\\n]*", unterminated_string_handler),
        pattern("^(?:0[xX][0-9a-fA-F]+|0[oO][0-7]+|0[bB][01]+|[0-9]+)", number_handler),
        pattern("^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern("^\\[", MK_NESTING_HANDLER!(TokenKind::OpenBracket, "[", 1)),
        pattern("^\\]", MK_NESTING_HANDLER!(TokenKind::CloseBracket, "]", -1)),
        pattern("^\\{", MK_NESTING_HANDLER!(TokenKind::OpenCurly, "{", 1)),
        pattern("^\\}", MK_NESTING_HANDLER!(TokenKind::CloseCurly, "}", -1)),
        pattern("^\\(", MK_NESTING_HANDLER!(TokenKind::OpenParen, "(", 1)),
        pattern("^\\)", MK_NESTING_HANDLER!(TokenKind::CloseParen, ")", -1)),
        pattern("^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern("^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern("^!", MK_DEFAULT_HANDLER!(TokenKind::Bang, "!")),
        pattern("^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern("^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern("^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern("^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern("^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern("^\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern("^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern("^\\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
        pattern("^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern("^\\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern("^-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern("^\\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern("^/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern("^%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern("^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern("^\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern("^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern("^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

pub struct Lexer<'a> {
    tokens: Vec<Token>,
    source: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    nesting: i32,
    errors: Vec<Error>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            line: 0,
            column: 0,
            nesting: 0,
            errors: vec![],
        }
    }

    /// Moves the cursor `n` bytes forward, keeping line and column in sync.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn nest(&mut self, delta: i32) {
        self.nesting = (self.nesting + delta).max(0);
    }

    pub fn here(&self) -> (u32, u32) {
        (self.line, self.column)
    }

    pub fn location_from(&self, start: (u32, u32)) -> Location {
        Location::new(start.0, start.1, self.line, self.column)
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn matched(&self, regex: &Regex) -> &'a str {
        regex.find(self.remainder()).map_or("", |m| m.as_str())
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex).len();
    lexer.advance_n(matched);
    Ok(())
}

fn newline_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let start = lexer.here();
    lexer.advance_n(1);

    if lexer.nesting == 0 {
        let location = lexer.location_from(start);
        lexer.push(MK_TOKEN!(TokenKind::Newline, String::from("\\n"), location));
    }
    Ok(())
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let start = lexer.here();
    lexer.advance_n(matched.len());
    let location = lexer.location_from(start);

    if parse_integer(matched).is_none() {
        return Err(Error::new(
            ErrorImpl::NumberParseError {
                token: matched.to_string(),
            },
            location,
        ));
    }

    lexer.push(MK_TOKEN!(TokenKind::Number, matched.to_string(), location));
    Ok(())
}

/// Parses a decimal, `0x`, `0o` or `0b` integer literal.
pub fn parse_integer(text: &str) -> Option<i64> {
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}

fn string_kind(matched: &str) -> (TokenKind, &str) {
    match matched.strip_prefix('f') {
        Some(rest) => (TokenKind::FormatString, rest),
        None => (TokenKind::String, matched),
    }
}

fn multiline_string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let (kind, quoted) = string_kind(matched);
    let contents = quoted[3..quoted.len() - 3].to_string();

    let start = lexer.here();
    lexer.advance_n(matched.len());
    let location = lexer.location_from(start);
    lexer.push(MK_TOKEN!(kind, contents, location));
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let (kind, quoted) = string_kind(matched);
    let contents = unescape(&quoted[1..quoted.len() - 1]);

    let start = lexer.here();
    lexer.advance_n(matched.len());
    let location = lexer.location_from(start);
    lexer.push(MK_TOKEN!(kind, contents, location));
    Ok(())
}

fn unterminated_string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let start = lexer.here();
    let matched = lexer.matched(regex).len();
    lexer.advance_n(matched);
    Err(Error::new(ErrorImpl::UnterminatedString, lexer.location_from(start)))
}

fn unescape(raw: &str) -> String {
    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        let Some(next_ch) = chars.peek().copied() else {
            result.push(ch); // Keep the lone backslash
            break;
        };

        let simple = match next_ch {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'v' => Some('\x0b'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => None,
        };

        if let Some(escaped) = simple {
            result.push(escaped);
            chars.next();
            continue;
        }

        let digits = match next_ch {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => 0,
        };

        if digits == 0 {
            result.push(ch); // Keep the backslash
            continue;
        }

        chars.next();
        let mut hex = String::new();
        while hex.len() < digits {
            match chars.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(*c);
                    chars.next();
                }
                _ => break,
            }
        }

        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            Some(decoded) => result.push(decoded),
            None => {
                result.push('\\');
                result.push(next_ch);
                result.push_str(&hex);
            }
        }
    }

    result
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let start = lexer.here();
    lexer.advance_n(value.len());
    let location = lexer.location_from(start);

    let kind = RESERVED_LOOKUP
        .get(value)
        .copied()
        .unwrap_or(TokenKind::Identifier);
    lexer.push(MK_TOKEN!(kind, String::from(value), location));
    Ok(())
}

/// Splits `source` into tokens, ending with a single `EOF` token.
///
/// Fails on the first lexical error; `tokenize_recovering` keeps going.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let (tokens, mut errors) = tokenize_recovering(source);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors.remove(0))
    }
}

/// Splits `source` into tokens without stopping at lexical errors.
///
/// Each error becomes an `Invalid` token covering the offending text (the
/// rest of the line for an unterminated string). The errors are returned
/// in source order, each located exactly like its `Invalid` token.
pub fn tokenize_recovering(source: &str) -> (Vec<Token>, Vec<Error>) {
    let mut lex = Lexer::new(source);

    while !lex.at_eof() {
        let start = lex.pos;
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        let outcome = match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex),
            None => unrecognised_handler(&mut lex),
        };

        if let Err(error) = outcome {
            if lex.pos == start {
                lex.advance_n(lex.at().len_utf8());
            }
            let text = source[start..lex.pos].to_string();
            lex.push(MK_TOKEN!(TokenKind::Invalid, text, *error.get_location()));
            lex.errors.push(error);
        }
    }

    let end = lex.location_from(lex.here());
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), end));
    (lex.tokens, lex.errors)
}

fn unrecognised_handler(lexer: &mut Lexer) -> Result<(), Error> {
    let start = lexer.here();
    let token = lexer.at().to_string();
    lexer.advance_n(token.len());
    Err(Error::new(
        ErrorImpl::UnrecognisedToken { token },
        lexer.location_from(start),
    ))
}
