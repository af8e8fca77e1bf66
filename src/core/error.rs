// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The crate-wide error type.
//!
//! Every fallible function in `vtmux` returns [`Result<T>`], an alias for
//! `std::result::Result<T, VtmuxError>`. `VtmuxError` carries exactly the kinds named
//! in the design: malformed wire/log data, I/O failures, missing nodes or logs,
//! violated preconditions, and timeouts. It implements [`miette::Diagnostic`] so
//! binaries can report failures with `miette`'s fancy handler instead of a bare
//! `Display` chain.

use miette::Diagnostic;
use thiserror::Error;

/// The crate-wide error type. See the module docs for the rationale behind each
/// variant.
#[derive(Debug, Error, Diagnostic)]
pub enum VtmuxError {
    /// Malformed wire frame or on-disk log record.
    #[error("parse error: {0}")]
    Parse(String),

    /// A socket or PTY operation failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A referenced node, pane, or log file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A precondition was violated (e.g. use of a freed script value).
    #[error("invalid operation: {0}")]
    Invalid(String),

    /// An operation did not complete within its allotted time.
    #[error("timed out: {0}")]
    Timeout(String),
}

impl From<std::io::Error> for VtmuxError {
    fn from(err: std::io::Error) -> Self { VtmuxError::Io(err.to_string()) }
}

impl From<regex::Error> for VtmuxError {
    fn from(err: regex::Error) -> Self { VtmuxError::Parse(err.to_string()) }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VtmuxError>;

/// Message returned when a script-callable is invoked after its value was freed.
pub const FREED_VALUE_MESSAGE: &str = "cannot use freed value";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: VtmuxError = io_err.into();
        assert!(matches!(err, VtmuxError::Io(_)));
    }

    #[test]
    fn display_messages_are_stable() {
        let err = VtmuxError::NotFound("pane 7".to_string());
        assert_eq!(err.to_string(), "not found: pane 7");
    }
}
