//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Location;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Location::new(0, 10, 0, 11),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_error_location() {
    let location = Location::new(4, 2, 4, 9);
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "endif".to_string(),
        },
        location,
    );

    assert_eq!(error.get_location().start_line, 4);
    assert_eq!(error.get_location().end_column, 9);
}

#[test]
fn test_unknown_lazy_type_error() {
    let error = Error::new(
        ErrorImpl::UnknownLazyType {
            name: "python_installation".to_string(),
        },
        Location::null(),
    );

    assert_eq!(error.get_error_name(), "UnknownLazyType");
    assert_eq!(error.to_string(), "unknown lazy type \"python_installation\"");
}

#[test]
fn test_fatal_errors() {
    let assertion = Error::new(
        ErrorImpl::AssertionFailed {
            message: "boom".to_string(),
        },
        Location::null(),
    );
    assert!(assertion.is_fatal());
    assert_eq!(assertion.to_string(), "assertion failed: boom");

    let parse = Error::new(
        ErrorImpl::NumberParseError {
            token: "99999999999999999999".to_string(),
        },
        Location::null(),
    );
    assert!(!parse.is_fatal());
}

#[test]
fn test_spawn_and_command_failures_are_distinct() {
    let spawn = Error::new(
        ErrorImpl::SpawnFailed {
            command: "does-not-exist".to_string(),
            message: "No such file or directory".to_string(),
        },
        Location::null(),
    );
    let failed = Error::new(
        ErrorImpl::CommandFailed {
            command: "false".to_string(),
            returncode: 1,
            stderr: String::new(),
        },
        Location::null(),
    );

    assert!(!spawn.is_fatal());
    assert!(failed.is_fatal());
    assert_eq!(spawn.get_error_name(), "SpawnFailed");
    assert_eq!(failed.get_error_name(), "CommandFailed");
    assert_ne!(spawn.get_internal(), failed.get_internal());
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Location::null(),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: ")".to_string(),
        },
        Location::null(),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}
