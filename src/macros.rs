//! Utility macros for the analyzer.
//!
//! This module defines helper macros used throughout the crate:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for simple tokens
//! - `MK_NESTING_HANDLER!` - Like `MK_DEFAULT_HANDLER!`, for brackets
//! - `TYPES!` - Builds a normalised `TypeSet`
//!
//! These macros reduce boilerplate in the lexer and the built-in tables.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's string value
/// * `$location` - The source location
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), location);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $location:expr) => {
        Token {
            kind: $kind,
            value: $value,
            location: $location,
        }
    };
}

/// Creates a default lexer handler for simple single-token patterns.
///
/// Generates a handler function that creates a token with the given kind
/// and advances the lexer position by the token's length.
///
/// # Arguments
///
/// * `$kind` - The TokenKind to create
/// * `$value` - The literal string value (used for length calculation)
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^\\+").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| -> Result<(), Error> {
            let start = lexer.here();
            lexer.advance_n($value.len());
            let location = lexer.location_from(start);
            lexer.push(MK_TOKEN!($kind, String::from($value), location));
            Ok(())
        }
    };
}

/// Creates a handler for an opening or closing bracket.
///
/// Newlines are insignificant while the lexer is inside any bracket pair,
/// so these handlers also adjust the nesting depth by `$delta`.
#[macro_export]
macro_rules! MK_NESTING_HANDLER {
    ($kind:expr, $value:literal, $delta:expr) => {
        |lexer: &mut Lexer, _regex: &Regex| -> Result<(), Error> {
            lexer.nest($delta);
            let start = lexer.here();
            lexer.advance_n($value.len());
            let location = lexer.location_from(start);
            lexer.push(MK_TOKEN!($kind, String::from($value), location));
            Ok(())
        }
    };
}

/// Builds a `TypeSet` from a list of `Type` expressions.
///
/// # Example
///
/// ```ignore
/// let set = TYPES![Type::Str, Type::list(TYPES![Type::Str])];
/// ```
#[macro_export]
macro_rules! TYPES {
    () => {
        $crate::types::types::TypeSet::new()
    };
    ($($ty:expr),+ $(,)?) => {
        $crate::types::types::TypeSet::from_types(vec![$($ty),+])
    };
}
