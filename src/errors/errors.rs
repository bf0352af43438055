use std::fmt::Display;

use thiserror::Error;

use crate::Location;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    location: Location,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, location: Location) -> Self {
        Error {
            internal_error: error_impl,
            location,
        }
    }

    pub fn get_location(&self) -> &Location {
        &self.location
    }

    pub fn get_internal(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// Fatal errors end interpretation of the current file. A command that
    /// could not be spawned is reported at its call site instead.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::AssertionFailed { .. }
                | ErrorImpl::UserError { .. }
                | ErrorImpl::CommandFailed { .. }
                | ErrorImpl::Cancelled
        )
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnknownLazyType { .. } => "UnknownLazyType",
            ErrorImpl::Io { .. } => "Io",
            ErrorImpl::SpawnFailed { .. } => "SpawnFailed",
            ErrorImpl::CommandFailed { .. } => "CommandFailed",
            ErrorImpl::AssertionFailed { .. } => "AssertionFailed",
            ErrorImpl::UserError { .. } => "UserError",
            ErrorImpl::Cancelled => "Cancelled",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, is a closing bracket or keyword missing?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("String literal is missing its closing quote"))
            }
            ErrorImpl::UnknownLazyType { name } => {
                ErrorTip::Suggestion(format!("Type `{}` is not registered", name))
            }
            ErrorImpl::Io { path, .. } => {
                ErrorTip::Suggestion(format!("Check that `{}` exists and is readable", path))
            }
            ErrorImpl::SpawnFailed { command, .. } => {
                ErrorTip::Suggestion(format!("Is `{}` installed and on PATH?", command))
            }
            ErrorImpl::CommandFailed { .. } => ErrorTip::Suggestion(String::from(
                "Pass `check: false` to tolerate a non-zero exit status",
            )),
            ErrorImpl::AssertionFailed { .. } | ErrorImpl::UserError { .. } => ErrorTip::None,
            ErrorImpl::Cancelled => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unknown lazy type {name:?}")]
    UnknownLazyType { name: String },
    #[error("unable to read {path:?}: {message}")]
    Io { path: String, message: String },
    #[error("failed to spawn {command:?}: {message}")]
    SpawnFailed { command: String, message: String },
    #[error("command {command:?} failed with status {returncode}: {stderr}")]
    CommandFailed {
        command: String,
        returncode: i64,
        stderr: String,
    },
    #[error("assertion failed: {message}")]
    AssertionFailed { message: String },
    #[error("{message}")]
    UserError { message: String },
    #[error("analysis cancelled")]
    Cancelled,
}
