//! Verdict: non-fatal checkers with diff-based failure reports.
//!
//! A [`Checker`] compares a got [`Value`] against its extra arguments and
//! returns a structured [`CheckError`] instead of panicking. The [`report`]
//! module turns a failed check into readable text, including a few lines of
//! the test source around the failing assertion.
//!
//! ```rust
//! use verdict::{evaluate, render, Comment, Invocation, Value, EQUALS};
//!
//! let got = Value::from("42");
//! let args = [Value::from("47")];
//! let (result, notes) = evaluate(&EQUALS, &got, &args);
//! let err = result.unwrap_err();
//! let text = render(&EQUALS, &got, &args, &Comment::default(), &notes, &err, Some(&Invocation::caller()));
//! assert!(text.contains("not equal:"));
//! assert!(text.contains("sources:"));
//! ```

pub use crate::checkers::{
    check_arity, cmp_equals, evaluate, not, Checker, CmpOption, Notes, DEEP_EQUALS, EQUALS,
    ERROR_MATCHES, IS_NIL, MATCHES, PANIC_MATCHES,
};
pub use crate::errors::{is_bad_check, is_silent, CheckError, CheckResult};
pub use crate::report::{render, write_report, Comment, Invocation, Report, ReportConfig};
pub use crate::value::Value;

pub mod checkers;
pub mod diff;
pub mod errors;
pub mod output;
pub mod report;
pub mod value;
