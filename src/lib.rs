#![allow(clippy::module_inception)]

use std::{fmt::Display, path::Path};

use crate::analyzer::diagnostics::{Diagnostic, Severity};

pub mod analyzer;
pub mod ast;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod types;

extern crate regex;

/// A 0-based line/column range inside one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Location {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Location used for synthesized nodes.
    pub fn null() -> Self {
        Location::default()
    }

    /// Spans from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Location) -> Location {
        Location {
            start_line: self.start_line,
            start_column: self.start_column,
            end_line: other.end_line,
            end_column: other.end_column,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "[{}:{}] -> [{}:{}]",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Returns the text of the 0-based `line` of `content`, without its line break.
pub fn get_line(content: &str, line: u32) -> Option<&str> {
    content
        .split_inclusive('\n')
        .nth(line as usize)
        .map(|l| l.trim_end_matches(['\n', '\r']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_line() {
        let content = "Hello, world!\nfoo = 1\n\nTesting { }\n";
        assert_eq!(get_line(content, 0), Some("Hello, world!"));
        assert_eq!(get_line(content, 3), Some("Testing { }"));
        assert_eq!(get_line(content, 2), Some(""));
        assert_eq!(get_line(content, 9), None);
    }

    #[test]
    fn test_location_format() {
        let location = Location::new(1, 2, 3, 4);
        assert_eq!(location.format(), "[1:2] -> [3:4]");
        assert_eq!(Location::null().format(), "[0:0] -> [0:0]");
    }

    #[test]
    fn test_render_diagnostic() {
        let diagnostic = Diagnostic::new(
            Severity::Error,
            Location::new(1, 6, 1, 9),
            String::from("Unknown function `foo`"),
        );
        let rendered = render_diagnostic(&diagnostic, "x = 1\ny = foo()\n", Path::new("meson.build"));
        assert!(rendered.starts_with("error: Unknown function `foo`"));
        assert!(rendered.contains("2 | y = foo()"));
        assert!(rendered.contains("------^"));
    }
}

/// Renders a diagnostic against its source text.
///
/// ```text
/// error: message
/// -> meson.build
///    |
/// 20 | x = foo()
///    | ----^
/// ```
pub fn render_diagnostic(diagnostic: &Diagnostic, content: &str, file: &Path) -> String {
    let location = diagnostic.location;
    let line_text = get_line(content, location.start_line).unwrap_or("");

    let line_string = (location.start_line + 1).to_string();
    let padding = line_string.len() + 2;

    let mut out = String::new();
    out.push_str(&format!("{}: {}\n", diagnostic.severity, diagnostic.message));
    out.push_str(&format!("-> {}\n", file.to_string_lossy()));
    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = (location.start_column as usize).saturating_sub(removed_whitespace) + 1;
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ').count();
    (String::from(&string[start..]), start)
}
