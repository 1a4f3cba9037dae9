//! Structured outcomes of a failed check.
//!
//! Every checker reports failure through [`CheckError`]. The reporter only
//! looks at two things: whether the error is a bad check (the test itself is
//! malformed) and whether it is silent (only notes are worth showing).

use miette::Diagnostic;
use thiserror::Error;

/// The result of running a checker.
pub type CheckResult = Result<(), CheckError>;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CheckError {
    /// The check was invoked incorrectly: wrong arity, a pattern that is not
    /// a string or does not compile, a got value of the wrong kind.
    #[error("{message}")]
    #[diagnostic(
        code(verdict::bad_check),
        help("this is an error in the test, not in the code under test")
    )]
    BadCheck { message: String },

    /// The got value does not satisfy the checker.
    #[error("{message}")]
    #[diagnostic(code(verdict::failure))]
    Failure { message: String },

    /// A failure whose only useful content lives in the notes.
    #[error("")]
    #[diagnostic(code(verdict::silent))]
    Silent,
}

impl CheckError {
    pub fn bad_check(message: impl Into<String>) -> Self {
        CheckError::BadCheck {
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        CheckError::Failure {
            message: message.into(),
        }
    }

    pub fn silent() -> Self {
        CheckError::Silent
    }

    pub fn is_bad_check(&self) -> bool {
        matches!(self, CheckError::BadCheck { .. })
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, CheckError::Silent)
    }
}

/// Reports whether `err` signals a malformed check rather than a failed one.
pub fn is_bad_check(err: &CheckError) -> bool {
    err.is_bad_check()
}

/// Reports whether `err` carries no message of its own.
pub fn is_silent(err: &CheckError) -> bool {
    err.is_silent()
}

/// Constructs a [`CheckError::BadCheck`] from a format string.
#[macro_export]
macro_rules! bad_check {
    ($($arg:tt)*) => {
        $crate::errors::CheckError::bad_check(format!($($arg)*))
    };
}

/// Constructs a [`CheckError::Failure`] from a format string.
#[macro_export]
macro_rules! failure {
    ($($arg:tt)*) => {
        $crate::errors::CheckError::failure(format!($($arg)*))
    };
}
