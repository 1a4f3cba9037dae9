//! Checkers that match text against an anchored regular expression.

use std::panic::{self, AssertUnwindSafe};

use log::debug;
use regex::Regex;
use regex_syntax::ast::ErrorKind;

use super::{check_arity, guarded, panic_message, Checker, Notes};
use crate::diff;
use crate::errors::{CheckError, CheckResult};
use crate::value::Value;
use crate::{bad_check, failure};

/// Checks that a string, or the `Display` form of a stringer, matches a
/// pattern in full.
pub static MATCHES: Matches = Matches;

/// Checks that an error's message matches a pattern in full.
pub static ERROR_MATCHES: ErrorMatches = ErrorMatches;

/// Checks that calling a zero-argument function panics with a message that
/// matches a pattern in full.
///
/// The panic is recovered with [`std::panic::catch_unwind`], so the process
/// panic hook still runs and, with the default hook, prints the usual
/// `thread '..' panicked at ..` line to stderr. Install a quieter hook with
/// [`std::panic::set_hook`] if that output gets in the way.
///
/// ```rust
/// use verdict::checkers::{Checker, Notes, PANIC_MATCHES};
/// use verdict::value::Value;
/// let mut notes = Notes::new();
/// let got = Value::func(|| panic!("error: bad wolf"));
/// assert!(PANIC_MATCHES.check(&got, &[Value::from("error: .*")], &mut notes).is_ok());
/// assert_eq!(notes.get("panic value"), Some("error: bad wolf"));
/// ```
pub static PANIC_MATCHES: PanicMatches = PanicMatches;

fn pattern_info(name: &str, got: &str) -> (String, Vec<String>) {
    (name.to_string(), vec![got.to_string(), "regexp".to_string()])
}

/// Validates and compiles the pattern argument, anchored at both ends.
fn compile<'a>(pattern: &'a Value, notes: &mut Notes) -> Result<(Regex, &'a str), CheckError> {
    let Value::String(pattern) = pattern else {
        return Err(bad_check!(
            "the regular expression pattern must be a string, got {} instead",
            pattern.type_name()
        ));
    };
    if let Err(err) = regex_syntax::Parser::new().parse(pattern) {
        notes.push("regexp error", err.to_string());
        return Err(bad_check!(
            "cannot compile regular expression {:?}: error parsing regexp: {}: `{}`",
            pattern,
            parse_reason(&err),
            pattern
        ));
    }
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(regex) => Ok((regex, pattern.as_str())),
        Err(err) => {
            notes.push("regexp error", err.to_string());
            Err(bad_check!(
                "cannot compile regular expression {:?}: {}",
                pattern,
                err
            ))
        }
    }
}

/// Phrases a syntax error in the classic regexp wording.
fn parse_reason(err: &regex_syntax::Error) -> String {
    match err {
        regex_syntax::Error::Parse(err) => match err.kind() {
            ErrorKind::GroupUnclosed => "missing closing )".to_string(),
            ErrorKind::GroupUnopened => "unexpected )".to_string(),
            ErrorKind::ClassUnclosed => "missing closing ]".to_string(),
            ErrorKind::RepetitionMissing => "missing argument to repetition operator".to_string(),
            ErrorKind::RepetitionCountInvalid => "invalid repeat count".to_string(),
            ErrorKind::ClassRangeInvalid => "invalid character class range".to_string(),
            ErrorKind::EscapeUnrecognized | ErrorKind::EscapeUnexpectedEof => {
                "invalid escape sequence".to_string()
            }
            kind => kind.to_string(),
        },
        regex_syntax::Error::Translate(err) => err.kind().to_string(),
        other => other.to_string(),
    }
}

/// Matches `text` against the pattern argument, describing the subject as
/// `what` in the mismatch message.
fn match_text(text: &str, pattern: &Value, what: &str, notes: &mut Notes) -> CheckResult {
    let (regex, pattern) = compile(pattern, notes)?;
    if regex.is_match(text) {
        return Ok(());
    }
    Err(failure!(
        "{} mismatch:\n(-text +pattern)\n{}",
        what,
        diff::text_pattern(text, pattern)
    ))
}

fn pattern_text(args: &[Value]) -> String {
    match args.first() {
        Some(Value::String(pattern)) => pattern.clone(),
        Some(other) => format!("{:?}", other),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Matches;

impl Matches {
    fn subject(got: &Value) -> Result<(&'static str, String), CheckError> {
        match got {
            Value::String(s) => Ok(("string", s.clone())),
            Value::Stringer(s) => Ok(("Display value", s.to_string())),
            other => Err(bad_check!(
                "did not get a string or a Display value, got {} instead",
                other.type_name()
            )),
        }
    }
}

impl Checker for Matches {
    fn info(&self) -> (String, Vec<String>) {
        pattern_info("matches", "got value")
    }

    fn check(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        check_arity(self, args)?;
        let (what, text) = guarded(|| Self::subject(got))?;
        match_text(&text, &args[0], what, notes)
    }

    fn negated_failure(&self, got: &Value, args: &[Value]) -> CheckError {
        let text = Self::subject(got).map_or_else(|_| format!("{:?}", got), |(_, t)| t);
        failure!("{:?} matches {:?}, but should not", text, pattern_text(args))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorMatches;

impl ErrorMatches {
    fn message(got: &Value) -> Result<String, CheckError> {
        match got {
            Value::Error(err) => Ok(err.to_string()),
            Value::Nil => Err(bad_check!("did not get an error, got nil instead")),
            other => Err(bad_check!(
                "did not get an error, got {} instead",
                other.type_name()
            )),
        }
    }
}

impl Checker for ErrorMatches {
    fn info(&self) -> (String, Vec<String>) {
        pattern_info("error matches", "got error")
    }

    fn check(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        check_arity(self, args)?;
        let message = guarded(|| Self::message(got))?;
        match_text(&message, &args[0], "error message", notes)
    }

    fn negated_failure(&self, got: &Value, args: &[Value]) -> CheckError {
        let message = Self::message(got).unwrap_or_else(|_| format!("{:?}", got));
        failure!(
            "error {:?} matches {:?}, but should not",
            message,
            pattern_text(args)
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PanicMatches;

impl Checker for PanicMatches {
    fn info(&self) -> (String, Vec<String>) {
        pattern_info("panic matches", "function")
    }

    fn check(&self, got: &Value, args: &[Value], notes: &mut Notes) -> CheckResult {
        check_arity(self, args)?;
        let func = match got {
            Value::Func(Some(func)) => func,
            Value::Func(None) => return Err(bad_check!("expected a function, got a nil func instead")),
            other => {
                return Err(bad_check!(
                    "expected a function, got {} instead",
                    other.type_name()
                ))
            }
        };
        if !func.params().is_empty() {
            return Err(bad_check!(
                "expected a function accepting no arguments, got {} instead",
                func.signature()
            ));
        }
        // The pattern must be valid before the function gets to run.
        compile(&args[0], notes)?;

        let payload = match panic::catch_unwind(AssertUnwindSafe(|| func.call())) {
            Ok(()) => return Err(failure!("the function did not panic")),
            Err(payload) => panic_message(&*payload),
        };
        debug!("recovered panic from checked function: {}", payload);
        notes.push("panic value", payload.clone());
        match_text(&payload, &args[0], "panic message", notes)
    }

    fn negated_failure(&self, _got: &Value, args: &[Value]) -> CheckError {
        failure!("there was a panic matching {:?}", pattern_text(args))
    }
}
